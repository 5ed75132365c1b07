use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const ENV_CONFIG_PATH: &str = "ATTACK_ANALYZER_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_API_KEY: &str = "GOOGLE_API_KEY";
const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "MODEL_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PORT: u16 = 3000;

/// One configured model: the label reported to callers and the provider model id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub model: String,
}

impl ModelSpec {
    fn new(name: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            model: model.to_string(),
        }
    }
}

/// Ordered candidate lists. The first entry is tried first.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Image-conditioned models, tried in order until one succeeds
    #[serde(default = "default_vision_models")]
    pub vision: Vec<ModelSpec>,
    /// Text-only models used for strategy and advice prompts
    #[serde(default = "default_text_models")]
    pub text: Vec<ModelSpec>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            vision: default_vision_models(),
            text: default_text_models(),
        }
    }
}

fn default_vision_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("Gemini 1.5 Pro", "gemini-1.5-pro"),
        ModelSpec::new("Gemini 2.0 Flash", "gemini-2.0-flash"),
    ]
}

fn default_text_models() -> Vec<ModelSpec> {
    vec![ModelSpec::new("Gemini 2.0 Flash", "gemini-2.0-flash")]
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub models: ModelsConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub models: ModelsConfig,
    pub port: u16,
    pub host: String,
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            base_url: default_base_url(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let base_url = match std::env::var(ENV_BASE_URL) {
            Ok(raw) => Url::parse(&raw).unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "Invalid {}, using default", ENV_BASE_URL);
                default_base_url()
            }),
            Err(_) => default_base_url(),
        };

        let timeout_secs = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let models = Self::load_config_file(&config_path)
            .map(|cf| cf.models)
            .unwrap_or_default();

        Self {
            models,
            port,
            host,
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Read the model credential. It is kept out of `Config` so it never shows up in debug output.
    pub fn api_key() -> Option<String> {
        std::env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents, path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(contents: &str, path: &Path) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str::<ConfigFile>(contents) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    vision_models = config.models.vision.len(),
                    text_models = config.models.text.len(),
                    "Loaded configuration from file"
                );
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
