use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GENERIC_GENERATION_FAILURE: &str = "Generation failed";

/// Error body returned by the image service on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Server detail, or the generic message when the server sent none.
    pub fn message(&self) -> String {
        match self.detail.as_deref().map(str::trim) {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => GENERIC_GENERATION_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct ServiceRejection {
    pub status: u16,
    pub detail: String,
}

impl ServiceRejection {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<ServiceRejection> for ErrorBody {
    fn from(value: ServiceRejection) -> Self {
        Self {
            detail: Some(value.detail),
        }
    }
}
