use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde_json::{json, Value};
use shared::{
    domain::TemplateId,
    error::{ErrorBody, ServiceRejection},
    protocol::{GenerateResponse, HealthStatus, ImageSize, Quality, StyleCatalog},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::image_ref::DecodedImage;

pub const DEFAULT_AI_BASE_URL: &str = "http://127.0.0.1:8000";
pub const CONNECT_FAILURE_MESSAGE: &str =
    "Cannot connect to AI server. Make sure the API server is running.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{detail}")]
    Rejected { status: u16, detail: String },
    #[error("failed to reach AI server: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("AI image service is not configured")]
    Unconfigured,
    #[error("invalid response from AI server: {0}")]
    Decode(String),
    #[error("Generation failed - no success flag")]
    NoSuccess,
}

impl GenerationError {
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            GenerationError::Transport(_) | GenerationError::Unconfigured
        )
    }

    /// Text shown to the customer for a failed attempt.
    pub fn user_message(&self) -> String {
        if self.is_connection_failure() {
            CONNECT_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<ServiceRejection> for GenerationError {
    fn from(value: ServiceRejection) -> Self {
        GenerationError::Rejected {
            status: value.status,
            detail: value.detail,
        }
    }
}

/// Style parameters of the AI templates, shaped the way the service expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateStyle {
    RetroRemix { keyword: String, optional_text: String },
    FunnyToon { style: String },
    CoverShoot { style: String },
    GlitchPro { mode: String },
    FootyFan { team: String, style: String },
}

impl TemplateStyle {
    pub fn template_id(&self) -> TemplateId {
        let id = match self {
            TemplateStyle::RetroRemix { .. } => "retro-remix",
            TemplateStyle::FunnyToon { .. } => "funny-toon",
            TemplateStyle::CoverShoot { .. } => "cover-shoot",
            TemplateStyle::GlitchPro { .. } => "glitch-pro",
            TemplateStyle::FootyFan { .. } => "footy-fan",
        };
        TemplateId::from(id)
    }

    pub fn style_params(&self) -> Value {
        match self {
            TemplateStyle::RetroRemix {
                keyword,
                optional_text,
            } => json!({ "keyword": keyword, "optional_text": optional_text }),
            TemplateStyle::FunnyToon { style } | TemplateStyle::CoverShoot { style } => {
                json!({ "style": style })
            }
            TemplateStyle::GlitchPro { mode } => json!({ "style": mode }),
            TemplateStyle::FootyFan { team, style } => json!({ "team": team, "style": style }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub template_id: TemplateId,
    pub style_params: Value,
    pub image: Option<DecodedImage>,
    pub quality: Quality,
    pub size: ImageSize,
}

impl GenerationRequest {
    pub fn new(template_id: TemplateId, style_params: Value) -> Self {
        Self {
            template_id,
            style_params,
            image: None,
            quality: Quality::default(),
            size: ImageSize::default(),
        }
    }

    pub fn for_style(style: &TemplateStyle, image: Option<DecodedImage>) -> Self {
        Self {
            image,
            ..Self::new(style.template_id(), style.style_params())
        }
    }

    pub fn with_image(mut self, image: DecodedImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    fn into_form(self) -> Result<Form, GenerationError> {
        let mut form = Form::new()
            .text("template_id", self.template_id.0)
            .text("style_params", self.style_params.to_string())
            .text("quality", self.quality.as_str())
            .text("size", self.size.as_str());
        if let Some(image) = self.image {
            let file_name = image.file_name();
            let part = Part::bytes(image.bytes)
                .file_name(file_name)
                .mime_str(&image.mime_type)
                .map_err(|e| GenerationError::Decode(format!("invalid image mime type: {e}")))?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerateResponse, GenerationError>;
    async fn check_health(&self) -> Result<HealthStatus, GenerationError>;
    fn image_url(&self, filename: &str) -> String;
}

pub struct MissingImageGenerator;

#[async_trait]
impl ImageGenerator for MissingImageGenerator {
    async fn generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        Err(GenerationError::Unconfigured)
    }

    async fn check_health(&self) -> Result<HealthStatus, GenerationError> {
        Err(GenerationError::Unconfigured)
    }

    fn image_url(&self, filename: &str) -> String {
        format!("/image/{filename}")
    }
}

/// HTTP client for the external image generation service.
#[derive(Clone)]
pub struct AiImageClient {
    http: Client,
    base_url: String,
}

impl AiImageClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn generate_image(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        let template_id = request.template_id.clone();
        let has_image = request.image.is_some();
        info!(
            template_id = %template_id,
            quality = %request.quality,
            size = %request.size,
            has_image,
            "ai: generate requested"
        );
        let form = request.into_form()?;
        let response = self
            .http
            .post(format!("{}/generate", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(GenerationError::Transport)?;
        let response = ensure_success(response).await?;
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        info!(
            template_id = %template_id,
            success = body.success,
            filename = %body.filename,
            "ai: generate finished"
        );
        Ok(body)
    }

    pub async fn template_styles(
        &self,
        template_id: &TemplateId,
    ) -> Result<StyleCatalog, GenerationError> {
        let response = self
            .http
            .get(format!("{}/styles/{}", self.base_url, template_id))
            .send()
            .await
            .map_err(GenerationError::Transport)?;
        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))
    }

    pub async fn health(&self) -> Result<HealthStatus, GenerationError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(GenerationError::Transport)?;
        let health: HealthStatus = response
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        debug!(status = %health.status, "ai: health");
        Ok(health)
    }
}

#[async_trait]
impl ImageGenerator for AiImageClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        self.generate_image(request).await
    }

    async fn check_health(&self) -> Result<HealthStatus, GenerationError> {
        self.health().await
    }

    fn image_url(&self, filename: &str) -> String {
        format!("{}/image/{filename}", self.base_url)
    }
}

async fn ensure_success(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: ErrorBody = response.json().await.unwrap_or_default();
    let rejection = ServiceRejection::new(status.as_u16(), body.message());
    warn!(status = rejection.status, detail = %rejection.detail, "ai: request rejected");
    Err(rejection.into())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub output_tokens: u32,
    pub total_cost: f64,
    pub breakdown: String,
}

const OUTPUT_TOKEN_PRICE_PER_MILLION: f64 = 40.0;
const INPUT_TOKEN_PRICE_PER_MILLION: f64 = 10.0;
const REFERENCE_IMAGE_TOKENS: f64 = 1000.0;
const BASE_INPUT_COST: f64 = 0.0001;

pub fn output_tokens(quality: Quality, size: ImageSize) -> u32 {
    match (quality, size) {
        (Quality::Low, ImageSize::Square) => 272,
        (Quality::Low, ImageSize::Portrait) => 408,
        (Quality::Low, ImageSize::Landscape) => 400,
        (Quality::Medium, ImageSize::Square) => 1056,
        (Quality::Medium, ImageSize::Portrait) => 1584,
        (Quality::Medium, ImageSize::Landscape) => 1568,
        (Quality::High, ImageSize::Square) => 4160,
        (Quality::High, ImageSize::Portrait) => 6240,
        (Quality::High, ImageSize::Landscape) => 6208,
    }
}

/// Rough USD cost of one generation.
pub fn estimate_cost(quality: Quality, size: ImageSize, has_reference: bool) -> CostEstimate {
    let output_tokens = output_tokens(quality, size);
    let output_cost = f64::from(output_tokens) * OUTPUT_TOKEN_PRICE_PER_MILLION / 1_000_000.0;
    let mut input_cost = BASE_INPUT_COST;
    if has_reference {
        input_cost += REFERENCE_IMAGE_TOKENS * INPUT_TOKEN_PRICE_PER_MILLION / 1_000_000.0;
    }
    CostEstimate {
        output_tokens,
        total_cost: output_cost + input_cost,
        breakdown: format!(
            "{output_tokens} output tokens, {} reference image",
            if has_reference { "with" } else { "no" }
        ),
    }
}

#[cfg(test)]
#[path = "tests/ai_tests.rs"]
mod tests;
