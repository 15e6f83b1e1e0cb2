use super::*;

fn designed_state() -> OrderState {
    OrderState {
        session_id: Some(SessionId::new("kiosk-7")),
        qr_session: true,
        brand: Some(Brand::Iphone),
        model: Some("iphone-16".into()),
        uploaded_images: vec![ImageRef::from_url("a"), ImageRef::from_url("b")],
        custom_text: "Hi".into(),
        selected_font: Some("Arial".into()),
        design_complete: true,
        order_status: OrderStatus::Payment,
        ..OrderState::default()
    }
}

#[test]
fn reset_keeps_only_session_fields() {
    let state = reduce(&designed_state(), &Action::ResetState);
    assert_eq!(
        state,
        OrderState {
            session_id: Some(SessionId::new("kiosk-7")),
            qr_session: true,
            ..OrderState::default()
        }
    );
}

#[test]
fn session_id_is_set_once() {
    let first = reduce(
        &OrderState::default(),
        &Action::SetQrSession(SessionParams {
            session_id: Some(SessionId::new("one")),
            qr_session: false,
        }),
    );
    let second = reduce(
        &first,
        &Action::SetQrSession(SessionParams {
            session_id: Some(SessionId::new("two")),
            qr_session: true,
        }),
    );
    assert_eq!(second.session_id, Some(SessionId::new("one")));
    assert!(second.qr_session);
}

#[test]
fn status_only_moves_one_step_forward() {
    let state = OrderState::default();
    let skipped = reduce(&state, &Action::SetOrderStatus(OrderStatus::Queue));
    assert_eq!(skipped.order_status, OrderStatus::Designing);

    let paid = reduce(&state, &Action::SetOrderStatus(OrderStatus::Payment));
    assert_eq!(paid.order_status, OrderStatus::Payment);

    let backwards = reduce(&paid, &Action::SetOrderStatus(OrderStatus::Designing));
    assert_eq!(backwards.order_status, OrderStatus::Payment);

    let same = reduce(&paid, &Action::SetOrderStatus(OrderStatus::Payment));
    assert_eq!(same, paid);
}

#[test]
fn image_list_actions() {
    let state = designed_state();
    let removed = reduce(&state, &Action::RemoveImage(0));
    assert_eq!(removed.uploaded_images, vec![ImageRef::from_url("b")]);

    let untouched = reduce(&state, &Action::RemoveImage(9));
    assert_eq!(untouched, state);

    let added = reduce(&state, &Action::AddImage(ImageRef::from_url("c")));
    assert_eq!(added.uploaded_images.len(), 3);
    assert!(reduce(&added, &Action::ClearImages).uploaded_images.is_empty());
}

#[test]
fn unknown_action_type_changes_nothing() {
    let action: Action =
        serde_json::from_str(r#"{"type":"SET_SPACESHIP"}"#).expect("decode unknown action");
    assert_eq!(action, Action::Unknown);
    let state = designed_state();
    assert_eq!(reduce(&state, &action), state);
}

#[test]
fn actions_use_tagged_wire_form() {
    let json = serde_json::to_value(Action::SetCustomText("Hello".into())).expect("encode");
    assert_eq!(
        json,
        serde_json::json!({"type": "SET_CUSTOM_TEXT", "payload": "Hello"})
    );
    assert_eq!(Action::ClearImages.kind(), "CLEAR_IMAGES");
}

#[test]
fn load_state_takes_session_only_from_live_state() {
    let live = OrderState {
        session_id: Some(SessionId::new("live")),
        loading: true,
        ..OrderState::default()
    };
    let saved = OrderState {
        session_id: Some(SessionId::new("saved")),
        ..designed_state()
    };
    let merged = reduce(&live, &Action::LoadState(Box::new(saved)));
    assert_eq!(merged.session_id, Some(SessionId::new("live")));
    assert!(merged.loading);
    assert_eq!(merged.custom_text, "Hi");
    assert_eq!(merged.order_status, OrderStatus::Payment);

    let fresh = reduce(
        &OrderState::default(),
        &Action::LoadState(Box::new(designed_state())),
    );
    assert_eq!(fresh.session_id, None);
    assert!(!fresh.qr_session);
    assert_eq!(fresh.custom_text, "Hi");
}

#[test]
fn snapshot_json_omits_transient_fields() {
    let state = OrderState {
        error: Some("boom".into()),
        loading: true,
        ..designed_state()
    };
    let json = state.to_snapshot_json().expect("encode");
    assert!(json.contains("\"customText\":\"Hi\""));
    assert!(!json.contains("loading"));
    assert!(!json.contains("boom"));

    let restored = OrderState::from_snapshot_json(&json).expect("decode");
    assert_eq!(restored.error, None);
    assert!(!restored.loading);
    assert_eq!(restored.uploaded_images, state.uploaded_images);
}

#[test]
fn session_params_from_entry_url() {
    let params =
        SessionParams::from_url("https://kiosk.local/?session=abc-123&qr=true").expect("url");
    assert_eq!(params.session_id, Some(SessionId::new("abc-123")));
    assert!(params.qr_session);

    let plain = SessionParams::from_query("?lang=en");
    assert!(plain.is_empty());
    assert!(SessionParams::from_url("not a url").is_err());
}
