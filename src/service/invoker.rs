//! Sequential multi-model fallback
//!
//! Candidates are tried one at a time in configured order. The first success wins. An
//! authentication failure stops the loop at once; every other failure moves on to the
//! next candidate until the list is exhausted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::service::llm::{GenerationRequest, GenerativeModel, ModelError};

/// Substrings that mark a credential problem. Matched case-insensitively.
pub const AUTH_MARKERS: &[&str] = &["api key", "unauthorized", "401", "403"];

/// Substrings that mark quota exhaustion or throttling. Matched case-insensitively.
pub const QUOTA_MARKERS: &[&str] = &["quota", "rate limit", "429", "too many requests"];

/// Default bound on a single model call
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// How a candidate failure is treated by the fallback loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    Quota,
    Other,
}

impl FailureKind {
    /// Classify an error message. Auth markers win over quota markers.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
            FailureKind::Auth
        } else if QUOTA_MARKERS.iter().any(|m| lower.contains(m)) {
            FailureKind::Quota
        } else {
            FailureKind::Other
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Auth => "auth",
            FailureKind::Quota => "quota",
            FailureKind::Other => "other",
        }
    }
}

/// A named model handle
#[derive(Clone)]
pub struct ModelCandidate {
    pub name: String,
    pub handle: Arc<dyn GenerativeModel>,
}

impl ModelCandidate {
    pub fn new(name: impl Into<String>, handle: Arc<dyn GenerativeModel>) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }
}

impl std::fmt::Debug for ModelCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCandidate")
            .field("name", &self.name)
            .field("model", &self.handle.model_id())
            .finish()
    }
}

/// Successful completion and the candidate that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvokeError {
    /// Credential rejected; remaining candidates were not tried
    #[error("API authentication failed: {message}")]
    AuthenticationFailed { model: String, message: String },

    /// Every candidate failed; carries the last failure
    #[error("All models failed. Last error from {model}: {message}")]
    AllModelsFailed { model: String, message: String },

    #[error("No model candidates configured")]
    NoCandidates,
}

/// What the loop does after a failed attempt
#[derive(Debug, PartialEq, Eq)]
enum AttemptDecision {
    Failover,
    Terminal(InvokeError),
}

fn decide(kind: FailureKind, candidate: &str, message: &str, has_more: bool) -> AttemptDecision {
    match kind {
        FailureKind::Auth => AttemptDecision::Terminal(InvokeError::AuthenticationFailed {
            model: candidate.to_string(),
            message: message.to_string(),
        }),
        FailureKind::Quota | FailureKind::Other if has_more => AttemptDecision::Failover,
        FailureKind::Quota | FailureKind::Other => {
            AttemptDecision::Terminal(InvokeError::AllModelsFailed {
                model: candidate.to_string(),
                message: message.to_string(),
            })
        }
    }
}

/// Ordered candidate list with sequential fallback
#[derive(Debug, Clone)]
pub struct ModelInvoker {
    candidates: Arc<[ModelCandidate]>,
    attempt_timeout: Duration,
}

impl ModelInvoker {
    pub fn new(candidates: Vec<ModelCandidate>) -> Self {
        Self {
            candidates: candidates.into(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    /// Run the fallback loop for one request
    pub async fn invoke(&self, request: &GenerationRequest) -> Result<ModelResponse, InvokeError> {
        let total = self.candidates.len();
        if total == 0 {
            return Err(InvokeError::NoCandidates);
        }

        for (index, candidate) in self.candidates.iter().enumerate() {
            let attempt = index + 1;
            let started = Instant::now();

            tracing::info!(
                model = %candidate.name,
                attempt = attempt,
                total = total,
                has_image = request.image.is_some(),
                "Attempting model call"
            );

            let outcome =
                match tokio::time::timeout(self.attempt_timeout, candidate.handle.generate(request))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ModelError::new(format!(
                        "Request timed out after {}s",
                        self.attempt_timeout.as_secs()
                    ))),
                };

            let elapsed_ms = started.elapsed().as_millis();

            let err = match outcome {
                Ok(text) => {
                    tracing::info!(
                        model = %candidate.name,
                        attempt = attempt,
                        elapsed_ms = elapsed_ms,
                        response_length = text.len(),
                        "Model call succeeded"
                    );
                    return Ok(ModelResponse {
                        text,
                        model_used: candidate.name.clone(),
                    });
                }
                Err(err) => err,
            };

            let kind = FailureKind::classify(&err.message);
            let has_more = attempt < total;

            tracing::warn!(
                model = %candidate.name,
                attempt = attempt,
                total = total,
                elapsed_ms = elapsed_ms,
                failure = kind.as_str(),
                error = %err,
                "Model call failed"
            );

            match decide(kind, &candidate.name, &err.message, has_more) {
                AttemptDecision::Failover => {
                    tracing::info!(
                        model = %candidate.name,
                        failure = kind.as_str(),
                        "Falling back to next model"
                    );
                }
                AttemptDecision::Terminal(terminal) => {
                    tracing::error!(model = %candidate.name, error = %terminal, "Model fallback stopped");
                    return Err(terminal);
                }
            }
        }

        // Only reachable with an empty list, which is rejected above
        Err(InvokeError::NoCandidates)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_classify_auth_markers() {
        assert_eq!(
            FailureKind::classify("API key not valid. Please pass a valid API key."),
            FailureKind::Auth
        );
        assert_eq!(FailureKind::classify("HTTP 401 Unauthorized"), FailureKind::Auth);
        assert_eq!(FailureKind::classify("HTTP 403 Forbidden: denied"), FailureKind::Auth);
    }

    #[test]
    fn test_classify_quota_markers() {
        assert_eq!(
            FailureKind::classify("Resource has been exhausted (e.g. check quota)."),
            FailureKind::Quota
        );
        assert_eq!(FailureKind::classify("HTTP 429 Too Many Requests"), FailureKind::Quota);
        assert_eq!(FailureKind::classify("rate limit reached"), FailureKind::Quota);
    }

    #[test]
    fn test_classify_auth_wins_over_quota() {
        assert_eq!(
            FailureKind::classify("quota check failed: API key revoked"),
            FailureKind::Auth
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(FailureKind::classify("HTTP 500 Internal Server Error"), FailureKind::Other);
    }

    #[tokio::test]
    async fn test_falls_back_through_quota_errors() {
        let first = ScriptedModel::always_err("m1", "HTTP 429 Too Many Requests");
        let second = ScriptedModel::always_err("m2", "quota exceeded");
        let third = ScriptedModel::always_ok("m3", "analysis text");
        let invoker = invoker_of(&[
            ("First", Arc::clone(&first)),
            ("Second", Arc::clone(&second)),
            ("Third", Arc::clone(&third)),
        ]);

        let response = invoker
            .invoke(&GenerationRequest::text("prompt"))
            .await
            .unwrap();

        assert_eq!(response.text, "analysis text");
        assert_eq!(response.model_used, "Third");
        assert_eq!((first.calls(), second.calls(), third.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let first = ScriptedModel::always_ok("m1", "done");
        let second = ScriptedModel::always_ok("m2", "unused");
        let invoker = invoker_of(&[("First", Arc::clone(&first)), ("Second", Arc::clone(&second))]);

        let response = invoker.invoke(&GenerationRequest::text("p")).await.unwrap();

        assert_eq!(response.model_used, "First");
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_auth_error_aborts_immediately() {
        let first = ScriptedModel::always_err("m1", "API key not valid");
        let second = ScriptedModel::always_ok("m2", "unused");
        let invoker = invoker_of(&[("First", Arc::clone(&first)), ("Second", Arc::clone(&second))]);

        let err = invoker.invoke(&GenerationRequest::text("p")).await.unwrap_err();

        assert!(matches!(err, InvokeError::AuthenticationFailed { .. }));
        assert!(err.to_string().starts_with("API authentication failed"));
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_quota_errors_aggregate_last_candidate() {
        let first = ScriptedModel::always_err("m1", "quota exceeded");
        let second = ScriptedModel::always_err("m2", "HTTP 429 Too Many Requests: slow down");
        let invoker = invoker_of(&[("First", first), ("Second", second)]);

        let err = invoker.invoke(&GenerationRequest::text("p")).await.unwrap_err();

        assert_eq!(
            err,
            InvokeError::AllModelsFailed {
                model: "Second".to_string(),
                message: "HTTP 429 Too Many Requests: slow down".to_string(),
            }
        );
        let rendered = err.to_string();
        assert!(rendered.contains("Second"));
        assert!(rendered.contains("slow down"));
    }

    #[tokio::test]
    async fn test_generic_error_continues_to_next_candidate() {
        let first = ScriptedModel::always_err("m1", "HTTP 500 Internal Server Error");
        let second = ScriptedModel::always_ok("m2", "recovered");
        let invoker = invoker_of(&[("First", first), ("Second", Arc::clone(&second))]);

        let response = invoker.invoke(&GenerationRequest::text("p")).await.unwrap();

        assert_eq!(response.model_used, "Second");
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_generic_error_on_last_candidate_aggregates() {
        let only = ScriptedModel::always_err("m1", "socket closed");
        let invoker = invoker_of(&[("Only", only)]);

        let err = invoker.invoke(&GenerationRequest::text("p")).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "All models failed. Last error from Only: socket closed"
        );
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let invoker = ModelInvoker::new(vec![]);
        let err = invoker.invoke(&GenerationRequest::text("p")).await.unwrap_err();
        assert_eq!(err, InvokeError::NoCandidates);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_candidate_times_out_and_falls_back() {
        let backup = ScriptedModel::always_ok("m2", "late but fine");
        let invoker = ModelInvoker::new(vec![
            ModelCandidate::new("Hanging", Arc::new(HangingModel)),
            ModelCandidate::new("Backup", Arc::clone(&backup) as Arc<dyn GenerativeModel>),
        ])
        .with_attempt_timeout(Duration::from_secs(5));

        let response = invoker.invoke(&GenerationRequest::text("p")).await.unwrap();

        assert_eq!(response.model_used, "Backup");
    }

    #[test]
    fn test_decide_failover_only_with_more_candidates() {
        assert_eq!(
            decide(FailureKind::Quota, "A", "quota", true),
            AttemptDecision::Failover
        );
        assert!(matches!(
            decide(FailureKind::Other, "A", "boom", false),
            AttemptDecision::Terminal(InvokeError::AllModelsFailed { .. })
        ));
        assert!(matches!(
            decide(FailureKind::Auth, "A", "401", true),
            AttemptDecision::Terminal(InvokeError::AuthenticationFailed { .. })
        ));
    }
}
