//! In-progress order state and its pure transition function.

use serde::{Deserialize, Serialize};
use shared::domain::{Brand, OrderNumber, OrderStatus, SessionId, TemplateDescriptor};
use tracing::warn;
use url::Url;

use crate::image_ref::ImageRef;

/// The order being designed. Serialized with camelCase keys; `error` and
/// `loading` are transient and never written to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderState {
    pub session_id: Option<SessionId>,
    pub qr_session: bool,
    pub brand: Option<Brand>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub uploaded_images: Vec<ImageRef>,
    pub template: Option<TemplateDescriptor>,
    pub custom_text: String,
    pub selected_font: Option<String>,
    pub text_color: Option<String>,
    pub design_complete: bool,
    pub order_number: Option<OrderNumber>,
    pub queue_position: Option<u32>,
    pub order_status: OrderStatus,
    #[serde(skip)]
    pub error: Option<String>,
    #[serde(skip)]
    pub loading: bool,
}

impl OrderState {
    /// Defaults, keeping only the session fields of `self`.
    pub fn reset_preserving_session(&self) -> Self {
        Self {
            session_id: self.session_id.clone(),
            qr_session: self.qr_session,
            ..Self::default()
        }
    }

    pub fn to_snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_snapshot_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Session marker carried by the kiosk entry URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionParams {
    pub session_id: Option<SessionId>,
    pub qr_session: bool,
}

impl SessionParams {
    /// Reads `session=<id>` and the presence of a `qr` flag from the query.
    pub fn from_url(url: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url)?;
        Ok(Self::from_query(parsed.query().unwrap_or_default()))
    }

    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "session" if params.session_id.is_none() && !value.trim().is_empty() => {
                    params.session_id = Some(SessionId::new(value.trim()));
                }
                "qr" => params.qr_session = true,
                _ => {}
            }
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && !self.qr_session
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneSelection {
    pub brand: Option<Brand>,
    pub model: Option<String>,
    pub color: Option<String>,
}

/// Store updates. JSON form is `{"type": "SET_TEMPLATE", "payload": ...}`;
/// unrecognised types decode to [`Action::Unknown`] and change nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetQrSession(SessionParams),
    SetPhoneSelection(PhoneSelection),
    SetTemplate(Option<TemplateDescriptor>),
    AddImage(ImageRef),
    RemoveImage(usize),
    ClearImages,
    SetCustomText(String),
    SetFont(Option<String>),
    SetTextColor(Option<String>),
    SetDesignComplete(bool),
    SetOrderStatus(OrderStatus),
    SetOrderNumber(Option<OrderNumber>),
    SetQueuePosition(Option<u32>),
    SetError(Option<String>),
    SetLoading(bool),
    ResetState,
    /// Merge a saved snapshot. Session fields stay those of the live state.
    LoadState(Box<OrderState>),
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetQrSession(_) => "SET_QR_SESSION",
            Action::SetPhoneSelection(_) => "SET_PHONE_SELECTION",
            Action::SetTemplate(_) => "SET_TEMPLATE",
            Action::AddImage(_) => "ADD_IMAGE",
            Action::RemoveImage(_) => "REMOVE_IMAGE",
            Action::ClearImages => "CLEAR_IMAGES",
            Action::SetCustomText(_) => "SET_CUSTOM_TEXT",
            Action::SetFont(_) => "SET_FONT",
            Action::SetTextColor(_) => "SET_TEXT_COLOR",
            Action::SetDesignComplete(_) => "SET_DESIGN_COMPLETE",
            Action::SetOrderStatus(_) => "SET_ORDER_STATUS",
            Action::SetOrderNumber(_) => "SET_ORDER_NUMBER",
            Action::SetQueuePosition(_) => "SET_QUEUE_POSITION",
            Action::SetError(_) => "SET_ERROR",
            Action::SetLoading(_) => "SET_LOADING",
            Action::ResetState => "RESET_STATE",
            Action::LoadState(_) => "LOAD_STATE",
            Action::Unknown => "UNKNOWN",
        }
    }
}

pub fn reduce(state: &OrderState, action: &Action) -> OrderState {
    let mut next = state.clone();
    match action {
        Action::SetQrSession(params) => {
            if next.session_id.is_none() {
                next.session_id = params.session_id.clone();
            }
            next.qr_session |= params.qr_session;
        }
        Action::SetPhoneSelection(selection) => {
            next.brand = selection.brand;
            next.model = selection.model.clone();
            next.color = selection.color.clone();
        }
        Action::SetTemplate(template) => next.template = template.clone(),
        Action::AddImage(image) => next.uploaded_images.push(image.clone()),
        Action::RemoveImage(index) => {
            if *index < next.uploaded_images.len() {
                next.uploaded_images.remove(*index);
            }
        }
        Action::ClearImages => next.uploaded_images.clear(),
        Action::SetCustomText(text) => next.custom_text = text.clone(),
        Action::SetFont(font) => next.selected_font = font.clone(),
        Action::SetTextColor(color) => next.text_color = color.clone(),
        Action::SetDesignComplete(complete) => next.design_complete = *complete,
        Action::SetOrderStatus(status) => {
            if *status != state.order_status {
                if state.order_status.can_transition_to(*status) {
                    next.order_status = *status;
                } else {
                    warn!(
                        from = %state.order_status,
                        to = %status,
                        "state: ignoring out-of-order status transition"
                    );
                }
            }
        }
        Action::SetOrderNumber(number) => next.order_number = number.clone(),
        Action::SetQueuePosition(position) => next.queue_position = *position,
        Action::SetError(error) => next.error = error.clone(),
        Action::SetLoading(loading) => next.loading = *loading,
        Action::ResetState => next = state.reset_preserving_session(),
        Action::LoadState(saved) => {
            next = OrderState {
                session_id: state.session_id.clone(),
                qr_session: state.qr_session,
                error: state.error.clone(),
                loading: state.loading,
                ..(**saved).clone()
            };
        }
        Action::Unknown => {}
    }
    next
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
