//! Application state and service initialization
//!
//! Model clients are built once here and injected into the analyzer, so handlers never
//! construct provider handles themselves.

use std::sync::Arc;

use actix_web::web;

use crate::model::{Config, ModelSpec};
use crate::service::{AttackAnalyzer, GeminiClient, ModelCandidate, ModelInvoker};

/// Application state shared with Actix-web handlers
pub struct AppState {
    pub analyzer: web::Data<AttackAnalyzer>,
}

impl AppState {
    /// Build application state, reading the API key from the environment
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Self::with_api_key(config, Config::api_key())
    }

    pub fn with_api_key(config: &Config, api_key: Option<String>) -> Result<Self, AppError> {
        let api_key = api_key.ok_or(AppError::MissingConfig("GOOGLE_API_KEY"))?;

        if config.models.vision.is_empty() {
            return Err(AppError::InvalidConfig("models.vision must not be empty"));
        }
        if config.models.text.is_empty() {
            return Err(AppError::InvalidConfig("models.text must not be empty"));
        }

        let vision = Self::build_invoker(&config.models.vision, config, &api_key)?;
        let text = Self::build_invoker(&config.models.text, config, &api_key)?;

        Ok(Self {
            analyzer: web::Data::new(AttackAnalyzer::new(vision, text)),
        })
    }

    /// One client per configured model, in configured order
    fn build_invoker(
        specs: &[ModelSpec],
        config: &Config,
        api_key: &str,
    ) -> Result<ModelInvoker, AppError> {
        let candidates = specs
            .iter()
            .map(|spec| {
                let client = GeminiClient::new(
                    &config.base_url,
                    api_key,
                    &spec.model,
                    config.request_timeout,
                )
                .map_err(|e| {
                    tracing::error!(model = %spec.model, error = %e, "Failed to build model client");
                    AppError::InvalidConfig("Invalid model client configuration")
                })?;
                Ok(ModelCandidate::new(spec.name.clone(), Arc::new(client)))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(ModelInvoker::new(candidates).with_attempt_timeout(config.request_timeout))
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
