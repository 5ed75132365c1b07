//! Image payloads accepted by the vision endpoints

use serde::Serialize;

/// Media type assumed for remote references, which carry no declared type
pub const DEFAULT_REMOTE_MEDIA_TYPE: &str = "image/png";

/// Image inputs shorter than this cannot reference a real screenshot
pub const MIN_IMAGE_DATA_LEN: usize = 100;

/// Minimum length of the base64 payload after the comma
pub const MIN_BASE64_PAYLOAD_LEN: usize = 50;

const DATA_URI_PREFIX: &str = "data:image/";

/// Image forwarded to the model, either inline or by reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageInput {
    Inline { media_type: String, data: String },
    Remote { uri: String, media_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageInputError {
    #[error("Invalid or empty image data provided. Please upload a valid base image.")]
    Empty,

    #[error("Invalid base64 image data. Please upload a valid image file.")]
    InvalidBase64,

    #[error("Invalid image data URI: missing media type")]
    MissingMediaType,
}

impl ImageInput {
    /// Parse a `data:image/<subtype>;base64,<payload>` URI or an opaque URI
    pub fn parse(raw: &str) -> Result<Self, ImageInputError> {
        let raw = raw.trim();
        // Remote references are held to the same minimum as data URIs
        if raw.len() < MIN_IMAGE_DATA_LEN {
            return Err(ImageInputError::Empty);
        }

        if !raw.starts_with(DATA_URI_PREFIX) {
            return Ok(ImageInput::Remote {
                uri: raw.to_string(),
                media_type: DEFAULT_REMOTE_MEDIA_TYPE.to_string(),
            });
        }

        let (header, payload) = match raw.split_once(',') {
            Some((header, payload)) => (header, payload.trim()),
            None => return Err(ImageInputError::InvalidBase64),
        };

        if payload.len() < MIN_BASE64_PAYLOAD_LEN {
            return Err(ImageInputError::InvalidBase64);
        }

        // "data:image/png;base64" -> "image/png"
        let media_type = header
            .trim_start_matches("data:")
            .split(';')
            .next()
            .unwrap_or_default();

        if media_type.len() <= "image/".len() {
            return Err(ImageInputError::MissingMediaType);
        }

        Ok(ImageInput::Inline {
            media_type: media_type.to_string(),
            data: payload.to_string(),
        })
    }

    pub fn media_type(&self) -> &str {
        match self {
            ImageInput::Inline { media_type, .. } | ImageInput::Remote { media_type, .. } => {
                media_type
            }
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageInput::Inline { .. })
    }
}
