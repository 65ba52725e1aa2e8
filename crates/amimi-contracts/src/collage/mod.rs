mod validator;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;

use crate::error::MemoryError;

pub use validator::{inline_payloads, validate_image_response, InlinePayload, MIN_IMAGE_CHARS};

/// Content stored for hand-made collages; never decoded as base64.
pub const MANUAL_PLACEHOLDER_CONTENT: &str = "manual-placeholder-data";

pub const DEFAULT_IMAGE_FORMAT: &str = "png";

/// Untouched JSON body of an image-generation call.
///
/// Expected shape: `{candidates: [{content: {parts: [{inlineData: {data}}]}}]}`,
/// but nothing about it is trusted until [`validate_image_response`] runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImageResponse(Value);

impl RawImageResponse {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates().len()
    }

    pub(crate) fn candidates(&self) -> &[Value] {
        self.0
            .get("candidates")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Base64 image accepted into a memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedImage {
    content: String,
    format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl EncodedImage {
    pub(crate) fn validated(content: String) -> Self {
        Self {
            content,
            format: DEFAULT_IMAGE_FORMAT.to_string(),
            description: None,
        }
    }

    /// Stand-in collage for the manual path. The element list is kept for display only.
    pub fn manual_placeholder(elements: &[String]) -> Result<Self, MemoryError> {
        if elements.is_empty() {
            return Err(MemoryError::Input(
                "collage elements list cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            content: MANUAL_PLACEHOLDER_CONTENT.to_string(),
            format: DEFAULT_IMAGE_FORMAT.to_string(),
            description: Some(elements.join(", ")),
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_manual_placeholder(&self) -> bool {
        self.content == MANUAL_PLACEHOLDER_CONTENT
    }

    /// Raw image bytes. `None` for the manual placeholder, which has no bytes.
    pub fn decode(&self) -> anyhow::Result<Option<Vec<u8>>> {
        if self.is_manual_placeholder() {
            return Ok(None);
        }
        let bytes = BASE64
            .decode(self.content.as_bytes())
            .context("collage image base64 decode failed")?;
        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use serde_json::json;

    use crate::error::MemoryError;

    use super::{EncodedImage, RawImageResponse, BASE64, MANUAL_PLACEHOLDER_CONTENT};

    #[test]
    fn manual_placeholder_records_elements_and_skips_decoding() -> anyhow::Result<()> {
        let image = EncodedImage::manual_placeholder(&[
            "Amy on a video call".to_string(),
            "mountains".to_string(),
        ])?;
        assert!(image.is_manual_placeholder());
        assert_eq!(image.content(), MANUAL_PLACEHOLDER_CONTENT);
        assert_eq!(image.format(), "png");
        assert_eq!(image.description(), Some("Amy on a video call, mountains"));
        assert_eq!(image.decode()?, None);
        Ok(())
    }

    #[test]
    fn manual_placeholder_requires_elements() {
        assert!(matches!(
            EncodedImage::manual_placeholder(&[]),
            Err(MemoryError::Input(_))
        ));
    }

    #[test]
    fn validated_image_decodes_its_payload() -> anyhow::Result<()> {
        let image = EncodedImage::validated(BASE64.encode(b"\x89PNG fake"));
        assert_eq!(image.decode()?, Some(b"\x89PNG fake".to_vec()));

        let broken = EncodedImage::validated("not base64 !!".to_string());
        assert!(broken.decode().is_err());
        Ok(())
    }

    #[test]
    fn candidate_count_tolerates_odd_shapes() {
        assert_eq!(RawImageResponse::new(json!({})).candidate_count(), 0);
        assert_eq!(
            RawImageResponse::new(json!({"candidates": "nope"})).candidate_count(),
            0
        );
        assert_eq!(
            RawImageResponse::new(json!({"candidates": [{}, {}]})).candidate_count(),
            2
        );
    }
}
