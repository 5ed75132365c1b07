//! Generative model client
//!
//! [`GenerativeModel`] is the seam between the fallback loop and the provider. The
//! production implementation talks to the Google Generative Language REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::ImageInput;

/// One generation call: a prompt and an optional image
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImageInput>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: ImageInput) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// Failure reported by a model handle
///
/// The message is what the fallback loop inspects to decide whether to try the next
/// candidate, so provider status codes and error text must end up in it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ModelError {
    pub message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL is dropped so that nothing from it reaches logs or callers
        let err = err.without_url();
        if err.is_timeout() {
            ModelError::new(format!("network timeout: {}", err))
        } else if err.is_connect() {
            ModelError::new(format!("fetch failed: network connection error: {}", err))
        } else {
            ModelError::new(format!("HTTP request failed: {}", err))
        }
    }
}

/// A client bound to one model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider model identifier, e.g. `gemini-2.0-flash`
    fn model_id(&self) -> &str;

    /// Generate a completion and return its text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;
}

// ============================================================================
// Gemini wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        inline_data: Blob<'a>,
    },
    File {
        file_data: FileRef<'a>,
    },
}

#[derive(Debug, Serialize)]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct FileRef<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
    status: Option<String>,
}

fn build_body(request: &GenerationRequest) -> GenerateContentBody<'_> {
    let mut parts = vec![Part::Text {
        text: &request.prompt,
    }];

    match &request.image {
        Some(ImageInput::Inline { media_type, data }) => parts.push(Part::Inline {
            inline_data: Blob {
                mime_type: media_type,
                data,
            },
        }),
        Some(ImageInput::Remote { uri, media_type }) => parts.push(Part::File {
            file_data: FileRef {
                mime_type: media_type,
                file_uri: uri,
            },
        }),
        None => {}
    }

    GenerateContentBody {
        contents: vec![Content {
            role: "user",
            parts,
        }],
    }
}

/// Turn a non-2xx provider response into a classifiable error message
fn status_error(status: reqwest::StatusCode, body: &str) -> ModelError {
    let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{} ({})", envelope.error.message, code),
            None => envelope.error.message,
        },
        Err(_) => body.chars().take(300).collect(),
    };

    let reason = status.canonical_reason().unwrap_or("Unknown");
    ModelError::new(format!("HTTP {} {}: {}", status.as_u16(), reason, detail))
}

fn collect_text(response: GenerateContentResponse) -> Result<String, ModelError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::new("Model returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ModelError::new(format!(
            "Model returned an empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for one Gemini model
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for `model` under `base_url` (e.g. `.../v1beta`)
    pub fn new(
        base_url: &Url,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, String> {
        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            base_url.as_str().trim_end_matches('/'),
            model
        ))
        .map_err(|e| format!("Invalid model endpoint for {}: {}", model, e))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        tracing::debug!(
            model = %self.model,
            prompt_length = request.prompt.len(),
            has_image = request.image.is_some(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                ModelError::new(format!("Failed to parse model response: {}", e.without_url()))
            })?;

        collect_text(parsed)
    }
}
