use std::sync::Arc;

use shared::domain::{Brand, OrderNumber, OrderStatus, Price, TemplateDescriptor};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{payload::NavPayload, screen::Screen, slots::ImageSlots};
use crate::{
    ai::{GenerationRequest, ImageGenerator, MissingImageGenerator, TemplateStyle},
    catalog,
    generation::{GenerationOutcome, GenerationRefused, GenerationSession},
    image_ref::ImageRef,
    state::{Action, PhoneSelection},
    store::AppStateStore,
    transform::{Nudge, Orientation, TextPosition, TransformRange, TransformState},
};

const INITIAL_QUEUE_POSITION: u32 = 1;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("submit is disabled on {0}")]
    SubmitDisabled(Screen),
    #[error("{0} has no previous screen")]
    NoPreviousScreen(Screen),
    #[error("unknown route '{0}'")]
    UnknownRoute(String),
    #[error("unknown {brand} model '{model}'")]
    UnknownModel { brand: Brand, model: String },
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
    #[error("unknown font '{0}'")]
    UnknownFont(String),
    #[error("film strips hold 3 or 4 frames, not {0}")]
    InvalidStripCount(u8),
    #[error("slot {index} is out of range for {slots} slots")]
    SlotOutOfRange { index: usize, slots: usize },
    #[error("'{action}' is not available on {screen}")]
    NotAvailable { action: &'static str, screen: Screen },
    #[error(transparent)]
    Generation(#[from] GenerationRefused),
    #[error("failed to update order state: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// Ephemeral state of the current screen, built from the incoming payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub brand: Option<Brand>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub template: Option<TemplateDescriptor>,
    pub image: Option<ImageRef>,
    pub transform: TransformState,
    pub images: Vec<ImageRef>,
    pub image_transforms: Vec<TransformState>,
    pub slots: Option<ImageSlots>,
    pub strip_count: Option<u8>,
    pub style: Option<String>,
    pub custom_style: String,
    pub keyword: Option<String>,
    pub optional_text: String,
    pub team: Option<String>,
    pub ai_credits: Option<u32>,
    pub input_text: String,
    pub text_position: TextPosition,
    pub font: Option<String>,
    pub font_size: u32,
    pub text_color: Option<String>,
    pub design_image: Option<ImageRef>,
    pub price: Option<Price>,
    pub order_number: Option<OrderNumber>,
}

impl Draft {
    pub fn enter(screen: Screen, payload: NavPayload) -> Self {
        let brand = screen.brand().or(payload.brand);
        let model = match screen.brand() {
            Some(brand) => Some(
                payload
                    .model
                    .as_deref()
                    .and_then(|model| catalog::resolve_model(brand, model))
                    .unwrap_or_else(|| catalog::default_model(brand))
                    .to_string(),
            ),
            None => payload.model,
        };

        let transform = match screen.transform_range() {
            Some(range) => range.clamp(payload.transform.unwrap_or_else(|| range.reset())),
            None => payload.transform.unwrap_or_default(),
        };

        let slots = match screen {
            Screen::MultiImageUpload => Some(ImageSlots::restore(
                usize::from(
                    payload
                        .template
                        .as_ref()
                        .map(|template| template.image_count)
                        .filter(|count| *count > 0)
                        .unwrap_or(catalog::DEFAULT_MULTI_IMAGE_COUNT),
                ),
                TransformRange::MULTI_SLOT,
                &payload.uploaded_images,
                &payload.image_transforms,
            )),
            Screen::FilmStripUpload => Some(ImageSlots::restore(
                usize::from(payload.strip_count.unwrap_or(catalog::DEFAULT_FILM_STRIP_COUNT)),
                TransformRange::ABSOLUTE,
                &payload.uploaded_images,
                &payload.image_transforms,
            )),
            _ => None,
        };

        let (style, custom_style) = match (screen, payload.style) {
            (Screen::FootyFanStyle, None) => (
                Some(catalog::FOOTY_STYLE_PRESETS[0].to_string()),
                String::new(),
            ),
            (Screen::FootyFanStyle, Some(style))
                if !catalog::FOOTY_STYLE_PRESETS.contains(&style.as_str()) =>
            {
                (Some(catalog::CUSTOM_STYLE.to_string()), style)
            }
            (_, style) => (style, String::new()),
        };

        let team = match (screen, payload.team) {
            (Screen::FootyFan, None) => Some(catalog::DEFAULT_TEAM.to_string()),
            (_, team) => team,
        };

        let font = match (screen, payload.selected_font) {
            (Screen::FontSelection, None) => Some(catalog::DEFAULT_FONT.to_string()),
            (_, font) => font,
        };

        let text_color = match (screen, payload.text_color) {
            (Screen::TextColorSelection, None) => Some(catalog::DEFAULT_TEXT_COLOR.to_string()),
            (_, color) => color,
        };

        let price = match screen {
            Screen::Payment => Some(payload.price.unwrap_or(catalog::DEFAULT_PAYMENT_PRICE)),
            _ => payload.price,
        };

        Self {
            brand,
            model,
            color: payload.color,
            template: payload.template,
            image: payload.uploaded_image,
            transform,
            images: payload.uploaded_images,
            image_transforms: payload.image_transforms,
            slots,
            strip_count: payload.strip_count,
            style,
            custom_style,
            keyword: payload.keyword,
            optional_text: payload.optional_text.unwrap_or_default(),
            team,
            ai_credits: payload.ai_credits,
            input_text: payload.input_text.unwrap_or_default(),
            text_position: payload.text_position.unwrap_or_default().clamped(),
            font,
            font_size: catalog::clamp_font_size(
                payload.font_size.unwrap_or(catalog::DEFAULT_FONT_SIZE),
            ),
            text_color,
            design_image: payload.design_image,
            price,
            order_number: payload.order_number,
        }
    }

    /// Style to send: the custom text when the custom preset is picked.
    pub fn chosen_style(&self) -> Option<String> {
        match self.style.as_deref() {
            Some(catalog::CUSTOM_STYLE) => {
                let custom = self.custom_style.trim();
                (!custom.is_empty()).then(|| custom.to_string())
            }
            Some(style) => Some(style.to_string()),
            None => None,
        }
    }

    pub fn payload(&self) -> NavPayload {
        let (uploaded_images, image_transforms) = match &self.slots {
            Some(slots) => (slots.images(), slots.transforms()),
            None => (self.images.clone(), self.image_transforms.clone()),
        };
        let has_text = !self.input_text.is_empty();
        NavPayload {
            brand: self.brand,
            model: self.model.clone(),
            color: self.color.clone(),
            template: self.template.clone(),
            uploaded_image: self.image.clone(),
            uploaded_images,
            transform: self.image.as_ref().map(|_| self.transform),
            image_transforms,
            strip_count: self.strip_count,
            style: self.chosen_style(),
            keyword: self.keyword.clone(),
            optional_text: (!self.optional_text.is_empty()).then(|| self.optional_text.clone()),
            team: self.team.clone(),
            ai_credits: self.ai_credits,
            input_text: has_text.then(|| self.input_text.clone()),
            text_position: has_text.then_some(self.text_position),
            selected_font: self.font.clone(),
            font_size: self.font.as_ref().map(|_| self.font_size),
            text_color: self.text_color.clone(),
            design_image: self.design_image.clone(),
            price: self.price,
            order_number: self.order_number.clone(),
        }
    }

    /// Image shown at checkout: the single design image, else the first slot.
    fn checkout_image(&self) -> Option<ImageRef> {
        self.image
            .clone()
            .or_else(|| self.images.first().cloned())
            .or_else(|| self.design_image.clone())
    }
}

/// Drives one kiosk session through the screen graph.
///
/// Screens own their local [`Draft`]; moving to another screen rebuilds it
/// from the outgoing payload. Store checkpoints are dispatched on submit.
pub struct Wizard {
    store: Arc<AppStateStore>,
    generator: Arc<dyn ImageGenerator>,
    screen: Screen,
    draft: Draft,
    generation: Option<GenerationSession>,
    initial_credits: u32,
}

impl Wizard {
    pub fn new(store: Arc<AppStateStore>) -> Self {
        Self::with_generator(store, Arc::new(MissingImageGenerator))
    }

    pub fn with_generator(store: Arc<AppStateStore>, generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            store,
            generator,
            screen: Screen::Welcome,
            draft: Draft::enter(Screen::Welcome, NavPayload::default()),
            generation: None,
            initial_credits: catalog::DEFAULT_AI_CREDITS,
        }
    }

    /// Credits granted on a generate screen when none were carried in.
    pub fn with_initial_credits(mut self, credits: u32) -> Self {
        self.initial_credits = credits;
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn store(&self) -> &Arc<AppStateStore> {
        &self.store
    }

    pub fn generation(&self) -> Option<&GenerationSession> {
        self.generation.as_ref()
    }

    pub fn credits(&self) -> Option<u32> {
        self.generation
            .as_ref()
            .map(|session| session.credits().remaining())
            .or(self.draft.ai_credits)
    }

    /// Enters the screen behind a route with an empty payload.
    pub fn open(&mut self, path: &str) -> Result<Screen, FlowError> {
        let screen =
            Screen::from_path(path).ok_or_else(|| FlowError::UnknownRoute(path.to_string()))?;
        self.enter(screen, NavPayload::default());
        Ok(screen)
    }

    /// Replaces the current screen. Leaving a generate screen aborts its
    /// request; entering one with an image starts the first generation, so
    /// this must run inside a tokio runtime.
    pub fn enter(&mut self, screen: Screen, payload: NavPayload) {
        if let Some(session) = self.generation.take() {
            session.teardown();
        }
        debug!(from = %self.screen, to = %screen, "flow: enter");
        self.screen = screen;
        self.draft = Draft::enter(screen, payload);

        if screen.is_generate() {
            let credits = self.draft.ai_credits.unwrap_or(self.initial_credits);
            self.draft.ai_credits = Some(credits);
            let mut session = GenerationSession::new(self.generator.clone(), credits);
            if session.can_start() {
                match self.generation_request() {
                    Ok(request) => {
                        if let Err(refused) = session.start(request) {
                            debug!(%refused, "flow: first generation not started");
                        }
                    }
                    Err(err) => debug!(error = %err, "flow: no generation on entry"),
                }
            }
            self.generation = Some(session);
        }
    }

    pub fn can_submit(&self) -> bool {
        let draft = &self.draft;
        match self.screen {
            Screen::Welcome | Screen::Qr => true,
            Screen::PhoneBrand => draft.brand.is_some(),
            Screen::IphoneModel | Screen::GoogleModel | Screen::SamsungModel => {
                draft.model.is_some()
            }
            Screen::TemplateSelection => draft.template.is_some(),
            Screen::PhonePreview
            | Screen::RetroRemix
            | Screen::FunnyToon
            | Screen::CoverShoot
            | Screen::Glitch
            | Screen::FootyFan => draft.image.is_some(),
            Screen::FootyFanStyle => draft.chosen_style().is_some(),
            Screen::AiGenerate | Screen::FootyFanGenerate => {
                draft.image.is_some() || self.generated().is_some()
            }
            Screen::MultiImageUpload | Screen::FilmStripUpload => draft
                .slots
                .as_ref()
                .is_some_and(ImageSlots::is_complete),
            Screen::FilmStrip => draft.strip_count.is_some(),
            Screen::FontSelection => draft.font.is_some(),
            Screen::TextColorSelection => draft.text_color.is_some(),
            Screen::TextInput
            | Screen::Payment
            | Screen::OrderConfirmed
            | Screen::MultiOrderQueue
            | Screen::Completion => true,
        }
    }

    pub async fn submit(&mut self) -> Result<Screen, FlowError> {
        if !self.can_submit() {
            return Err(FlowError::SubmitDisabled(self.screen));
        }

        let mut payload = self.draft.payload();
        let next = match self.screen {
            Screen::Welcome | Screen::Qr => {
                self.start_new_order().await?;
                Screen::PhoneBrand
            }
            Screen::PhoneBrand => {
                self.start_new_order().await?;
                let brand = self
                    .draft
                    .brand
                    .ok_or(FlowError::SubmitDisabled(self.screen))?;
                Screen::model_screen(brand)
            }
            Screen::IphoneModel | Screen::GoogleModel | Screen::SamsungModel => {
                let brand = self.screen.brand();
                let model = self.draft.model.as_deref().map(catalog::model_slug);
                self.store
                    .dispatch(Action::SetPhoneSelection(PhoneSelection {
                        brand,
                        model: model.clone(),
                        color: self.draft.color.clone(),
                    }))
                    .await?;
                payload.brand = brand;
                payload.model = model;
                Screen::TemplateSelection
            }
            Screen::TemplateSelection => {
                let template = self
                    .draft
                    .template
                    .clone()
                    .ok_or(FlowError::SubmitDisabled(self.screen))?;
                self.store
                    .dispatch(Action::SetTemplate(Some(template.clone())))
                    .await?;
                Screen::after_template(&template)
            }
            Screen::PhonePreview => {
                self.store_images(self.draft.image.iter().cloned().collect())
                    .await?;
                Screen::after_preview(self.draft.template.as_ref())
            }
            Screen::MultiImageUpload | Screen::FilmStripUpload => {
                self.store_images(payload.uploaded_images.clone()).await?;
                Screen::TextInput
            }
            Screen::FilmStrip => Screen::FilmStripUpload,
            Screen::RetroRemix | Screen::FunnyToon | Screen::CoverShoot | Screen::Glitch => {
                Screen::AiGenerate
            }
            Screen::FootyFan => Screen::FootyFanStyle,
            Screen::FootyFanStyle => Screen::FootyFanGenerate,
            Screen::AiGenerate | Screen::FootyFanGenerate => {
                if let Some(generated) = self.generated().cloned() {
                    self.store_images(vec![generated.clone()]).await?;
                    payload.uploaded_image = Some(generated);
                }
                payload.ai_credits = self.credits();
                Screen::TextInput
            }
            Screen::TextInput => {
                self.store
                    .dispatch(Action::SetCustomText(self.draft.input_text.clone()))
                    .await?;
                Screen::FontSelection
            }
            Screen::FontSelection => {
                self.store
                    .dispatch(Action::SetFont(self.draft.font.clone()))
                    .await?;
                Screen::TextColorSelection
            }
            Screen::TextColorSelection => {
                self.store
                    .dispatch(Action::SetTextColor(self.draft.text_color.clone()))
                    .await?;
                self.store.dispatch(Action::SetDesignComplete(true)).await?;
                self.store
                    .dispatch(Action::SetOrderStatus(OrderStatus::Payment))
                    .await?;
                payload = NavPayload::checkout(self.draft.checkout_image(), catalog::CHECKOUT_PRICE);
                Screen::Payment
            }
            Screen::Payment => {
                let order_number = self.store.place_order(INITIAL_QUEUE_POSITION).await?;
                payload = NavPayload::checkout(
                    self.draft.design_image.clone(),
                    self.draft.price.unwrap_or(catalog::DEFAULT_PAYMENT_PRICE),
                );
                payload.order_number = Some(order_number);
                Screen::OrderConfirmed
            }
            Screen::OrderConfirmed => {
                payload = self.order_payload();
                Screen::MultiOrderQueue
            }
            Screen::MultiOrderQueue => {
                self.store.update_queue_position(0).await?;
                payload = self.order_payload();
                Screen::Completion
            }
            Screen::Completion => {
                if let Err(err) = self.store.complete_order().await {
                    warn!(error = %err, "flow: order was not completed before new order");
                }
                self.store.reset_state().await?;
                payload = NavPayload::default();
                Screen::Welcome
            }
        };

        info!(from = %self.screen, to = %next, "flow: submit");
        self.enter(next, payload);
        Ok(next)
    }

    /// Returns to the previous screen, rebuilding its payload from the
    /// current draft. Edits made only on the current screen are dropped.
    pub fn back(&mut self) -> Result<Screen, FlowError> {
        let previous = self.previous_screen()?;
        let payload = self.draft.payload();
        info!(from = %self.screen, to = %previous, "flow: back");
        self.enter(previous, payload);
        Ok(previous)
    }

    fn previous_screen(&self) -> Result<Screen, FlowError> {
        let template = self.draft.template.as_ref();
        let previous = match self.screen {
            Screen::Welcome
            | Screen::OrderConfirmed
            | Screen::MultiOrderQueue
            | Screen::Completion => return Err(FlowError::NoPreviousScreen(self.screen)),
            Screen::Qr | Screen::PhoneBrand => Screen::Welcome,
            Screen::IphoneModel | Screen::GoogleModel | Screen::SamsungModel => Screen::PhoneBrand,
            Screen::TemplateSelection => self
                .draft
                .brand
                .map(Screen::model_screen)
                .unwrap_or(Screen::PhoneBrand),
            Screen::PhonePreview | Screen::MultiImageUpload | Screen::FilmStrip => {
                Screen::TemplateSelection
            }
            Screen::FilmStripUpload => Screen::FilmStrip,
            Screen::RetroRemix
            | Screen::FunnyToon
            | Screen::CoverShoot
            | Screen::Glitch
            | Screen::FootyFan => Screen::PhonePreview,
            Screen::AiGenerate => match Screen::after_preview(template) {
                picker if picker.is_style_picker() => picker,
                _ => Screen::PhonePreview,
            },
            Screen::FootyFanStyle => Screen::FootyFan,
            Screen::FootyFanGenerate => Screen::FootyFanStyle,
            Screen::TextInput => match template {
                Some(template) if template.is_film_strip() => Screen::FilmStripUpload,
                Some(template) if template.is_multi_image() => Screen::MultiImageUpload,
                _ => Screen::PhonePreview,
            },
            Screen::FontSelection => Screen::TextInput,
            Screen::TextColorSelection => Screen::FontSelection,
            Screen::Payment => Screen::TextColorSelection,
        };
        Ok(previous)
    }

    pub fn select_brand(&mut self, brand: Brand) -> Result<(), FlowError> {
        self.require("select brand", self.screen == Screen::PhoneBrand)?;
        self.draft.brand = Some(brand);
        Ok(())
    }

    /// Accepts a display name (`IPHONE 16`) or a slug (`iphone-16`).
    pub fn select_model(&mut self, model: &str) -> Result<(), FlowError> {
        let brand = self.screen.brand().ok_or(FlowError::NotAvailable {
            action: "select model",
            screen: self.screen,
        })?;
        let resolved =
            catalog::resolve_model(brand, model).ok_or_else(|| FlowError::UnknownModel {
                brand,
                model: model.to_string(),
            })?;
        self.draft.model = Some(resolved.to_string());
        Ok(())
    }

    pub fn select_template(&mut self, id: &str) -> Result<(), FlowError> {
        self.require("select template", self.screen == Screen::TemplateSelection)?;
        let template =
            catalog::find_template(id).ok_or_else(|| FlowError::UnknownTemplate(id.to_string()))?;
        self.draft.template = Some(template);
        Ok(())
    }

    pub fn choose_strip_count(&mut self, count: u8) -> Result<(), FlowError> {
        self.require("choose strip count", self.screen == Screen::FilmStrip)?;
        if !catalog::FILM_STRIP_COUNTS.contains(&count) {
            return Err(FlowError::InvalidStripCount(count));
        }
        self.draft.strip_count = Some(count);
        Ok(())
    }

    /// Single-image editors: replaces the image and resets its transform.
    pub fn upload_image(&mut self, image: ImageRef) -> Result<(), FlowError> {
        let range = self.single_image_range("upload image")?;
        self.draft.image = Some(image);
        self.draft.transform = range.reset();
        Ok(())
    }

    pub fn remove_image(&mut self) -> Result<(), FlowError> {
        let range = self.single_image_range("remove image")?;
        self.draft.image = None;
        self.draft.transform = range.reset();
        Ok(())
    }

    pub fn select_slot(&mut self, index: usize) -> Result<(), FlowError> {
        let slots = self.slots_mut("select slot")?;
        let len = slots.len();
        if slots.select(index) {
            Ok(())
        } else {
            Err(FlowError::SlotOutOfRange { index, slots: len })
        }
    }

    /// Fills the selected slot.
    pub fn upload_slot_image(
        &mut self,
        image: ImageRef,
        orientation: Orientation,
    ) -> Result<(), FlowError> {
        self.slots_mut("upload slot image")?
            .fill_current(image, orientation);
        Ok(())
    }

    pub fn clear_slot(&mut self, index: usize) -> Result<(), FlowError> {
        let slots = self.slots_mut("clear slot")?;
        let len = slots.len();
        if slots.clear(index) {
            Ok(())
        } else {
            Err(FlowError::SlotOutOfRange { index, slots: len })
        }
    }

    /// Pans or zooms whatever the current screen edits: the selected slot,
    /// the single image, or the text overlay.
    pub fn nudge(&mut self, nudge: Nudge) -> Result<(), FlowError> {
        if let Some(slots) = self.draft.slots.as_mut() {
            slots.nudge_current(nudge);
            return Ok(());
        }
        if self.screen == Screen::TextInput {
            self.draft.text_position = self.draft.text_position.nudge(nudge);
            return Ok(());
        }
        let range = self.screen.transform_range().ok_or(FlowError::NotAvailable {
            action: "move image",
            screen: self.screen,
        })?;
        if self.draft.image.is_some() {
            self.draft.transform = range.nudge(self.draft.transform, nudge);
        }
        Ok(())
    }

    pub fn reset_transform(&mut self) -> Result<(), FlowError> {
        if let Some(slots) = self.draft.slots.as_mut() {
            slots.reset_current();
            return Ok(());
        }
        if self.screen == Screen::TextInput {
            self.draft.text_position = TextPosition::default();
            return Ok(());
        }
        let range = self.screen.transform_range().ok_or(FlowError::NotAvailable {
            action: "reset transform",
            screen: self.screen,
        })?;
        self.draft.transform = range.reset();
        Ok(())
    }

    /// Toon style, cover style, glitch mode or footy style preset.
    pub fn choose_style(&mut self, style: &str) -> Result<(), FlowError> {
        self.require(
            "choose style",
            matches!(
                self.screen,
                Screen::FunnyToon | Screen::CoverShoot | Screen::Glitch | Screen::FootyFanStyle
            ),
        )?;
        self.draft.style = Some(style.trim().to_string());
        Ok(())
    }

    pub fn set_custom_style(&mut self, text: &str) -> Result<(), FlowError> {
        self.require("set custom style", self.screen == Screen::FootyFanStyle)?;
        self.draft.style = Some(catalog::CUSTOM_STYLE.to_string());
        self.draft.custom_style = text.to_string();
        Ok(())
    }

    pub fn set_keyword(&mut self, keyword: &str) -> Result<(), FlowError> {
        self.require("set keyword", self.screen == Screen::RetroRemix)?;
        self.draft.keyword = Some(keyword.trim().to_string());
        Ok(())
    }

    pub fn set_optional_text(&mut self, text: &str) -> Result<(), FlowError> {
        self.require("set optional text", self.screen == Screen::RetroRemix)?;
        self.draft.optional_text = text.to_string();
        Ok(())
    }

    pub fn set_team(&mut self, team: &str) -> Result<(), FlowError> {
        self.require("set team", self.screen == Screen::FootyFan)?;
        let team = team.trim();
        self.draft.team = (!team.is_empty()).then(|| team.to_string());
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), FlowError> {
        self.require("set text", self.screen == Screen::TextInput)?;
        self.draft.input_text = text.to_string();
        Ok(())
    }

    pub fn select_font(&mut self, name: &str) -> Result<(), FlowError> {
        self.require("select font", self.screen == Screen::FontSelection)?;
        let font = catalog::find_font(name).ok_or_else(|| FlowError::UnknownFont(name.to_string()))?;
        self.draft.font = Some(font.name.to_string());
        Ok(())
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<(), FlowError> {
        self.require("set font size", self.screen == Screen::FontSelection)?;
        self.draft.font_size = catalog::clamp_font_size(size);
        Ok(())
    }

    /// Accepts a palette name or hex value; unknown values pick the default.
    pub fn select_text_color(&mut self, value: &str) -> Result<(), FlowError> {
        self.require("select text color", self.screen == Screen::TextColorSelection)?;
        self.draft.text_color = Some(catalog::find_text_color(value).value.to_string());
        Ok(())
    }

    /// Starts a (re)generation on a generate screen.
    pub fn generate(&mut self) -> Result<u64, FlowError> {
        self.require("generate", self.screen.is_generate())?;
        let exhausted = self
            .generation
            .as_ref()
            .is_some_and(|session| session.credits().is_exhausted());
        if exhausted {
            return Err(GenerationRefused::NoCredits.into());
        }
        let request = self.generation_request()?;
        let session = self.generation.as_mut().ok_or(FlowError::NotAvailable {
            action: "generate",
            screen: self.screen,
        })?;
        Ok(session.start(request)?)
    }

    /// Waits for the running generation, if any.
    pub async fn await_generation(&mut self) -> Option<GenerationOutcome> {
        self.generation.as_mut()?.finish().await
    }

    fn generated(&self) -> Option<&ImageRef> {
        self.generation.as_ref().and_then(GenerationSession::generated)
    }

    fn generation_request(&self) -> Result<GenerationRequest, FlowError> {
        let style = self.template_style().ok_or(FlowError::NotAvailable {
            action: "generate",
            screen: self.screen,
        })?;
        let Some(image) = self.draft.image.as_ref() else {
            return Err(GenerationRefused::NoImage.into());
        };
        if !image.is_data_url() {
            debug!(image = %image, "flow: only uploaded images can be sent for generation");
            return Err(GenerationRefused::NoImage.into());
        }
        let image = image.decode().map_err(|err| {
            debug!(error = %err, "flow: uploaded image could not be decoded");
            GenerationRefused::NoImage
        })?;
        Ok(GenerationRequest::for_style(&style, Some(image)))
    }

    fn template_style(&self) -> Option<TemplateStyle> {
        let draft = &self.draft;
        let style_or = |fallback: &str| {
            draft
                .chosen_style()
                .filter(|style| !style.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        if self.screen == Screen::FootyFanGenerate {
            return Some(TemplateStyle::FootyFan {
                team: draft
                    .team
                    .clone()
                    .unwrap_or_else(|| catalog::DEFAULT_TEAM.to_string()),
                style: style_or(catalog::FOOTY_STYLE_PRESETS[0]),
            });
        }
        let style = match draft.template.as_ref()?.id.as_str() {
            "retro-remix" => TemplateStyle::RetroRemix {
                keyword: draft
                    .keyword
                    .clone()
                    .filter(|keyword| !keyword.is_empty())
                    .unwrap_or_else(|| catalog::RETRO_KEYWORDS[0].to_string()),
                optional_text: draft.optional_text.clone(),
            },
            "funny-toon" => TemplateStyle::FunnyToon {
                style: style_or(catalog::TOON_STYLES[0]),
            },
            "cover-shoot" => TemplateStyle::CoverShoot {
                style: style_or(catalog::COVER_STYLES[0]),
            },
            "glitch-pro" => TemplateStyle::GlitchPro {
                mode: style_or(catalog::GLITCH_MODES[0]),
            },
            "footy-fan" => TemplateStyle::FootyFan {
                team: draft
                    .team
                    .clone()
                    .unwrap_or_else(|| catalog::DEFAULT_TEAM.to_string()),
                style: style_or(catalog::FOOTY_STYLE_PRESETS[0]),
            },
            _ => return None,
        };
        Some(style)
    }

    /// Clears an order left behind past design (abandoned or restored from
    /// an earlier run) so the new design can reach payment.
    async fn start_new_order(&self) -> Result<(), FlowError> {
        let status = self.store.snapshot().await.order_status;
        if status != OrderStatus::Designing {
            info!(%status, "flow: starting a new order over a stale one");
            self.store.reset_state().await?;
        }
        Ok(())
    }

    async fn store_images(&self, images: Vec<ImageRef>) -> Result<(), FlowError> {
        self.store.dispatch(Action::ClearImages).await?;
        for image in images {
            self.store.dispatch(Action::AddImage(image)).await?;
        }
        Ok(())
    }

    fn order_payload(&self) -> NavPayload {
        NavPayload {
            design_image: self.draft.design_image.clone(),
            price: self.draft.price,
            order_number: self.draft.order_number.clone(),
            ..NavPayload::default()
        }
    }

    fn single_image_range(&self, action: &'static str) -> Result<TransformRange, FlowError> {
        let editable = matches!(
            self.screen,
            Screen::PhonePreview
                | Screen::RetroRemix
                | Screen::FunnyToon
                | Screen::CoverShoot
                | Screen::Glitch
                | Screen::FootyFan
        );
        self.require(action, editable)?;
        self.screen.transform_range().ok_or(FlowError::NotAvailable {
            action,
            screen: self.screen,
        })
    }

    fn slots_mut(&mut self, action: &'static str) -> Result<&mut ImageSlots, FlowError> {
        let screen = self.screen;
        self.draft
            .slots
            .as_mut()
            .ok_or(FlowError::NotAvailable { action, screen })
    }

    fn require(&self, action: &'static str, allowed: bool) -> Result<(), FlowError> {
        if allowed {
            Ok(())
        } else {
            Err(FlowError::NotAvailable {
                action,
                screen: self.screen,
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
