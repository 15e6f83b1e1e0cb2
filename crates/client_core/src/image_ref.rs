use std::{fmt, path::Path};

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// An image shown on the case: either an uploaded file inlined as a `data:`
/// URL or a generated image served by the AI service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File name used for the multipart part, derived from the MIME type.
    pub fn file_name(&self) -> String {
        let extension = mime_guess::get_mime_extensions_str(&self.mime_type)
            .and_then(|extensions| extensions.first())
            .copied()
            .unwrap_or("png");
        format!("upload.{extension}")
    }
}

impl ImageRef {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)))
    }

    pub async fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(DEFAULT_IMAGE_MIME);
        Ok(Self::from_bytes(&bytes, mime))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// Bytes of an inlined upload. Remote references cannot be decoded.
    pub fn decode(&self) -> Result<DecodedImage> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| anyhow!("image is not an inline upload"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| anyhow!("malformed data url"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| anyhow!("data url is not base64 encoded"))?;
        let mime_type = if mime_type.is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            mime_type
        };
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| anyhow!("invalid data url payload: {e}"))?;
        Ok(DecodedImage {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_data_url() {
            let kind = self.0[5..].split([';', ',']).next().unwrap_or_default();
            write!(f, "<inline {kind}, {} chars>", self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
#[path = "tests/image_ref_tests.rs"]
mod tests;
