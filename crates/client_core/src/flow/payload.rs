use serde::{Deserialize, Serialize};
use shared::domain::{Brand, OrderNumber, Price, TemplateDescriptor};

use crate::{
    image_ref::ImageRef,
    transform::{TextPosition, TransformState},
};

/// Data handed from one screen to the next. Every field is optional; a
/// screen that finds a field missing falls back to its own default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_image: Option<ImageRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uploaded_images: Vec<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_transforms: Vec<TransformState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_count: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_credits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_position: Option<TextPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_image: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<OrderNumber>,
}

impl NavPayload {
    /// Checkout hand-off: only the design and the price travel to payment.
    pub fn checkout(design_image: Option<ImageRef>, price: Price) -> Self {
        Self {
            design_image,
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
