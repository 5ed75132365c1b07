//! Unified API error handling
//!
//! Every failure is answered with `{success: false, error, details?, requestId}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::service::{AnalyzerError, InvokeError};

pub const NETWORK_DETAILS: &str =
    "Network connectivity issue. Please check your internet connection and try again.";
pub const API_KEY_DETAILS: &str =
    "API key issue. Please verify your Google API key is valid and has the correct permissions.";

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// What the endpoint failed to do
    pub error: String,
    /// Normalized cause, for model failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Unique request ID for tracing
    pub request_id: String,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Bad request / validation error (400)
    #[error("{0}")]
    BadRequest(String),

    /// Model provider failure (502)
    #[error("{context}: {details}")]
    ExternalService {
        context: &'static str,
        details: String,
    },
}

/// Map an invoker failure onto a message safe to show to callers
pub fn normalize_details(err: &InvokeError) -> String {
    let message = err.to_string();
    let lower = message.to_lowercase();

    if lower.contains("fetch failed") || lower.contains("network") {
        return NETWORK_DETAILS.to_string();
    }

    match err {
        InvokeError::AuthenticationFailed { .. } => API_KEY_DETAILS.to_string(),
        InvokeError::AllModelsFailed { .. } => format!(
            "All available vision models have failed or hit quota limits. Please try again later. Details: {}",
            message
        ),
        _ => format!("AI service error: {}", message),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        let (error_type, error, details) = match self {
            ApiError::BadRequest(message) => ("bad_request", message.clone(), None),
            ApiError::ExternalService { context, details } => (
                "external_service_error",
                context.to_string(),
                Some(details.clone()),
            ),
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            request_id = %request_id,
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error,
            details,
            request_id,
        })
    }
}

impl From<AnalyzerError> for ApiError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Validation(message) => ApiError::BadRequest(message),
            AnalyzerError::Model { context, source } => ApiError::ExternalService {
                context,
                details: normalize_details(&source),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_normalize_auth() {
        let err = InvokeError::AuthenticationFailed {
            model: "Gemini 1.5 Pro".to_string(),
            message: "HTTP 403 Forbidden: API key not valid".to_string(),
        };
        assert_eq!(normalize_details(&err), API_KEY_DETAILS);
    }

    #[test]
    fn test_normalize_network_wins() {
        let err = InvokeError::AllModelsFailed {
            model: "Gemini 2.0 Flash".to_string(),
            message: "fetch failed: network connection error: refused".to_string(),
        };
        assert_eq!(normalize_details(&err), NETWORK_DETAILS);
    }

    #[test]
    fn test_normalize_exhausted() {
        let err = InvokeError::AllModelsFailed {
            model: "Gemini 2.0 Flash".to_string(),
            message: "HTTP 429 Too Many Requests: quota".to_string(),
        };
        let details = normalize_details(&err);
        assert!(details.starts_with("All available vision models have failed"));
        assert!(details.ends_with(
            "All models failed. Last error from Gemini 2.0 Flash: HTTP 429 Too Many Requests: quota"
        ));
    }

    #[test]
    fn test_normalize_no_candidates() {
        assert_eq!(
            normalize_details(&InvokeError::NoCandidates),
            "AI service error: No model candidates configured"
        );
    }

    #[actix_web::test]
    async fn test_bad_request_envelope() {
        let response = ApiError::BadRequest("Base image is required".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Base image is required");
        assert!(json.get("details").is_none());
        assert!(json["requestId"].as_str().is_some());
    }

    #[actix_web::test]
    async fn test_external_service_envelope() {
        let api_error = ApiError::from(AnalyzerError::Model {
            context: "Failed to analyze base",
            source: InvokeError::NoCandidates,
        });
        let response = api_error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Failed to analyze base");
        assert_eq!(json["details"], "AI service error: No model candidates configured");
    }
}
