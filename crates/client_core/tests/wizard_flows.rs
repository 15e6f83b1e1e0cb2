use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use client_core::{
    ai::GenerationRequest, catalog, AppStateStore, FlowError, GenerationError, GenerationOutcome,
    GenerationRefused, ImageGenerator, ImageRef, MemorySnapshotStore, Nudge, Orientation, Screen,
    SessionParams, SnapshotStore, Wizard, STATE_KEY,
};
use serde_json::{json, Value};
use shared::{
    domain::{Brand, OrderStatus, Price, SessionId},
    protocol::{GenerateResponse, HealthStatus},
};
use storage::Storage;
use tokio::sync::Mutex;

fn upload(name: &str) -> ImageRef {
    ImageRef::from_bytes(name.as_bytes(), "image/png")
}

fn memory_store() -> Arc<AppStateStore> {
    AppStateStore::new(Arc::new(MemorySnapshotStore::new()))
}

/// Walks welcome -> brand -> model -> template selection.
async fn choose_phone_and_template(wizard: &mut Wizard, template: &str) {
    assert_eq!(wizard.submit().await.expect("welcome"), Screen::PhoneBrand);
    assert!(!wizard.can_submit());
    wizard.select_brand(Brand::Iphone).expect("brand");
    assert_eq!(wizard.submit().await.expect("brand"), Screen::IphoneModel);
    wizard.select_model("IPHONE 16 PRO").expect("model");
    assert_eq!(
        wizard.submit().await.expect("model"),
        Screen::TemplateSelection
    );
    assert!(!wizard.can_submit());
    wizard.select_template(template).expect("template");
    wizard.submit().await.expect("template");
}

#[tokio::test]
async fn classic_order_from_welcome_to_new_order() {
    let store = AppStateStore::open(
        Arc::new(MemorySnapshotStore::new()),
        STATE_KEY,
        SessionParams::from_query("session=booth-1"),
    )
    .await
    .expect("open store");
    let mut wizard = Wizard::new(store.clone());

    choose_phone_and_template(&mut wizard, "classic").await;
    assert_eq!(wizard.screen(), Screen::PhonePreview);
    let state = store.snapshot().await;
    assert_eq!(state.brand, Some(Brand::Iphone));
    assert_eq!(state.model.as_deref(), Some("iphone-16-pro"));
    assert_eq!(
        state.template.as_ref().map(|t| t.id.as_str()),
        Some("classic")
    );

    assert!(!wizard.can_submit());
    let photo = upload("holiday");
    wizard.upload_image(photo.clone()).expect("upload");
    wizard.nudge(Nudge::Right).expect("pan");
    assert_eq!(wizard.submit().await.expect("preview"), Screen::TextInput);
    assert_eq!(wizard.draft().transform.x, 5.0);
    assert_eq!(store.snapshot().await.uploaded_images, vec![photo.clone()]);

    wizard.set_text("Hello").expect("text");
    wizard.nudge(Nudge::Up).expect("move text");
    assert_eq!(wizard.submit().await.expect("text"), Screen::FontSelection);
    wizard.select_font("Georgia").expect("font");
    assert_eq!(
        wizard.submit().await.expect("font"),
        Screen::TextColorSelection
    );
    wizard.select_text_color("#000000").expect("colour");
    assert_eq!(wizard.submit().await.expect("colour"), Screen::Payment);

    assert_eq!(wizard.draft().price, Some(Price::from_pence(1699)));
    assert_eq!(wizard.draft().design_image, Some(photo.clone()));
    assert_eq!(wizard.draft().brand, None);
    let state = store.snapshot().await;
    assert_eq!(state.custom_text, "Hello");
    assert_eq!(state.selected_font.as_deref(), Some("Georgia"));
    assert_eq!(state.text_color.as_deref(), Some("#000000"));
    assert!(state.design_complete);
    assert_eq!(state.order_status, OrderStatus::Payment);

    assert_eq!(wizard.submit().await.expect("pay"), Screen::OrderConfirmed);
    let state = store.snapshot().await;
    assert_eq!(state.order_status, OrderStatus::Queue);
    assert_eq!(state.queue_position, Some(1));
    assert_eq!(wizard.draft().order_number, state.order_number);
    assert!(state.order_number.is_some());

    assert_eq!(wizard.submit().await.expect("confirmed"), Screen::MultiOrderQueue);
    assert_eq!(wizard.submit().await.expect("queue"), Screen::Completion);
    assert_eq!(store.snapshot().await.order_status, OrderStatus::Printing);

    assert_eq!(wizard.submit().await.expect("new order"), Screen::Welcome);
    let state = store.snapshot().await;
    assert_eq!(state.session_id, Some(SessionId::new("booth-1")));
    assert_eq!(state.order_status, OrderStatus::Designing);
    assert!(state.uploaded_images.is_empty());
    assert_eq!(state.custom_text, "");
}

#[tokio::test]
async fn four_in_one_requires_every_slot() {
    let store = memory_store();
    let mut wizard = Wizard::new(store.clone());
    choose_phone_and_template(&mut wizard, "4-in-1").await;
    assert_eq!(wizard.screen(), Screen::MultiImageUpload);

    let photos: Vec<ImageRef> = ["a", "b", "c", "d"].into_iter().map(upload).collect();
    for (index, photo) in photos.iter().take(3).enumerate() {
        wizard.select_slot(index).expect("slot");
        wizard
            .upload_slot_image(photo.clone(), Orientation::Portrait)
            .expect("fill");
    }
    assert!(!wizard.can_submit());
    assert!(matches!(
        wizard.submit().await,
        Err(FlowError::SubmitDisabled(Screen::MultiImageUpload))
    ));

    wizard.select_slot(3).expect("last slot");
    wizard
        .upload_slot_image(photos[3].clone(), Orientation::Landscape)
        .expect("fill last");
    wizard.nudge(Nudge::ZoomIn).expect("zoom last");
    assert!(wizard.can_submit());
    assert_eq!(wizard.submit().await.expect("upload"), Screen::TextInput);

    assert_eq!(wizard.draft().images, photos);
    assert_eq!(store.snapshot().await.uploaded_images, photos);
    let zoomed = wizard.draft().image_transforms[3];
    assert!((zoomed.scale - 2.2).abs() < 1e-9);
}

#[tokio::test]
async fn slot_count_follows_template_image_count() {
    for (template, required) in [("classic", 1usize), ("2-in-1", 2), ("3-in-1", 3), ("4-in-1", 4)] {
        let mut wizard = Wizard::new(memory_store());
        choose_phone_and_template(&mut wizard, template).await;

        if required == 1 {
            assert_eq!(wizard.screen(), Screen::PhonePreview);
            assert!(!wizard.can_submit());
            wizard.upload_image(upload("only")).expect("upload");
            assert!(wizard.can_submit());
            continue;
        }

        assert_eq!(wizard.screen(), Screen::MultiImageUpload);
        for index in 0..required {
            assert!(!wizard.can_submit(), "{template}: {index} of {required}");
            wizard.select_slot(index).expect("slot");
            wizard
                .upload_slot_image(upload(&index.to_string()), Orientation::Unknown)
                .expect("fill");
        }
        assert!(wizard.can_submit(), "{template}");
    }
}

#[tokio::test]
async fn film_strip_walks_count_then_upload() {
    let mut wizard = Wizard::new(memory_store());
    choose_phone_and_template(&mut wizard, "film-strip-3").await;
    assert_eq!(wizard.screen(), Screen::FilmStrip);

    wizard.choose_strip_count(3).expect("count");
    assert_eq!(wizard.submit().await.expect("count"), Screen::FilmStripUpload);
    for index in 0..3 {
        wizard.select_slot(index).expect("slot");
        wizard
            .upload_slot_image(upload(&format!("frame-{index}")), Orientation::Landscape)
            .expect("frame");
    }
    wizard.nudge(Nudge::Right).expect("pan frame");
    assert_eq!(wizard.submit().await.expect("frames"), Screen::TextInput);
    assert_eq!(wizard.draft().strip_count, Some(3));
    assert_eq!(wizard.draft().image_transforms[2].x, 60.0);

    assert_eq!(wizard.back().expect("back"), Screen::FilmStripUpload);
    assert_eq!(
        wizard.draft().slots.as_ref().map(|slots| slots.filled_count()),
        Some(3)
    );
}

#[derive(Default)]
struct RecordingGenerator {
    calls: AtomicUsize,
    last_params: Mutex<Option<Value>>,
}

#[async_trait]
impl ImageGenerator for RecordingGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_params.lock().await = Some(request.style_params.clone());
        Ok(GenerateResponse {
            success: true,
            filename: format!("gen_{call}.png"),
            file_path: None,
            prompt: None,
            template_id: Some(request.template_id.0),
            style_params: Some(request.style_params),
        })
    }

    async fn check_health(&self) -> Result<HealthStatus, GenerationError> {
        Ok(HealthStatus {
            status: "healthy".into(),
            error: None,
            openai: None,
            models_available: None,
            suggestion: None,
        })
    }

    fn image_url(&self, filename: &str) -> String {
        format!("http://ai.test/image/{filename}")
    }
}

#[tokio::test]
async fn footy_fan_generation_spends_four_credits_then_refuses() {
    let store = memory_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut wizard = Wizard::with_generator(store.clone(), generator.clone());
    choose_phone_and_template(&mut wizard, "footy-fan").await;

    wizard.upload_image(upload("fan")).expect("upload");
    assert_eq!(wizard.submit().await.expect("preview"), Screen::FootyFan);
    wizard.set_team("Arsenal").expect("team");
    assert_eq!(wizard.submit().await.expect("team"), Screen::FootyFanStyle);
    wizard
        .choose_style(catalog::FOOTY_STYLE_PRESETS[2])
        .expect("style");
    assert_eq!(
        wizard.submit().await.expect("style"),
        Screen::FootyFanGenerate
    );

    let first = wizard.await_generation().await.expect("auto generation");
    assert!(matches!(first, GenerationOutcome::Generated { .. }));
    assert_eq!(wizard.credits(), Some(3));
    assert_eq!(
        *generator.last_params.lock().await,
        Some(json!({ "team": "Arsenal", "style": "Pop-art comic style" }))
    );

    for remaining in (0..3).rev() {
        wizard.generate().expect("regenerate");
        wizard.await_generation().await.expect("outcome");
        assert_eq!(wizard.credits(), Some(remaining));
    }
    assert!(matches!(
        wizard.generate(),
        Err(FlowError::Generation(GenerationRefused::NoCredits))
    ));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 4);

    assert_eq!(wizard.submit().await.expect("generated"), Screen::TextInput);
    let generated = ImageRef::from_url("http://ai.test/image/gen_4.png");
    assert_eq!(wizard.draft().image, Some(generated.clone()));
    assert_eq!(wizard.draft().ai_credits, Some(0));
    assert_eq!(store.snapshot().await.uploaded_images, vec![generated]);
}

#[tokio::test]
async fn style_picker_feeds_shared_generate_screen() {
    let generator = Arc::new(RecordingGenerator::default());
    let mut wizard = Wizard::with_generator(memory_store(), generator.clone());
    choose_phone_and_template(&mut wizard, "glitch-pro").await;

    wizard.upload_image(upload("me")).expect("upload");
    assert_eq!(wizard.submit().await.expect("preview"), Screen::Glitch);
    wizard.choose_style("Neon").expect("mode");
    assert_eq!(wizard.submit().await.expect("mode"), Screen::AiGenerate);
    wizard.await_generation().await.expect("outcome");
    assert_eq!(
        *generator.last_params.lock().await,
        Some(json!({ "style": "Neon" }))
    );

    assert_eq!(wizard.back().expect("back"), Screen::Glitch);
    assert_eq!(wizard.draft().style.as_deref(), Some("Neon"));
    assert!(wizard.generation().is_none());
}

#[tokio::test]
async fn order_survives_restart_in_sqlite() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("kiosk.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Storage::new(&database_url).await.expect("open sqlite");
        let store = AppStateStore::open(
            Arc::new(storage.clone()),
            STATE_KEY,
            SessionParams::from_query("session=booth-9&qr"),
        )
        .await
        .expect("open store");
        let mut wizard = Wizard::new(store);
        choose_phone_and_template(&mut wizard, "3-in-1").await;
        storage.close().await;
    }

    let storage = Storage::new(&database_url).await.expect("reopen sqlite");
    let store = AppStateStore::open(
        Arc::new(storage),
        STATE_KEY,
        SessionParams::from_query("session=booth-10"),
    )
    .await
    .expect("reopen store");
    let state = store.snapshot().await;
    assert_eq!(state.session_id, Some(SessionId::new("booth-10")));
    assert!(!state.qr_session);
    assert_eq!(state.model.as_deref(), Some("iphone-16-pro"));
    assert_eq!(
        state.template.as_ref().map(|t| t.image_count),
        Some(3)
    );
}

#[tokio::test]
async fn restored_order_past_payment_does_not_block_a_new_one() {
    let snapshots = Arc::new(MemorySnapshotStore::new());
    snapshots
        .save(
            STATE_KEY,
            r#"{"orderStatus":"queue","orderNumber":"4321","queuePosition":2,"customText":"Old"}"#,
        )
        .await
        .expect("seed abandoned order");
    let store = AppStateStore::open(
        snapshots,
        STATE_KEY,
        SessionParams::from_query("session=booth-4"),
    )
    .await
    .expect("open store");
    assert_eq!(store.snapshot().await.order_status, OrderStatus::Queue);

    let mut wizard = Wizard::new(store.clone());
    choose_phone_and_template(&mut wizard, "classic").await;
    let state = store.snapshot().await;
    assert_eq!(state.order_status, OrderStatus::Designing);
    assert_eq!(state.order_number, None);
    assert_eq!(state.session_id, Some(SessionId::new("booth-4")));

    wizard.upload_image(upload("fresh")).expect("upload");
    wizard.submit().await.expect("preview");
    wizard.submit().await.expect("text");
    wizard.submit().await.expect("font");
    assert_eq!(wizard.submit().await.expect("colour"), Screen::Payment);
    assert_eq!(store.snapshot().await.order_status, OrderStatus::Payment);

    assert_eq!(wizard.submit().await.expect("pay"), Screen::OrderConfirmed);
    let state = store.snapshot().await;
    assert_eq!(state.order_status, OrderStatus::Queue);
    assert!(state.order_number.is_some());
    assert_eq!(state.queue_position, Some(1));
    assert_eq!(state.custom_text, "");
}
