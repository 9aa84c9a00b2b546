//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::endpoints;
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Artifact bundle location and strategy selection
    #[serde(default)]
    pub artifacts: ArtifactConfig,

    /// Chat/explanation collaborator
    #[serde(default)]
    pub explain: ExplainConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_artifacts()?;
        self.validate_explain()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 Only the local development origin will be allowed."
            );
        }

        Ok(())
    }

    fn validate_artifacts(&self) -> Result<(), ConfigError> {
        if self.artifacts.dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "artifacts.dir".to_string(),
                message: "Artifact directory must be set".to_string(),
            });
        }
        Ok(())
    }

    fn validate_explain(&self) -> Result<(), ConfigError> {
        let explain = &self.explain;

        if !(0.0..=2.0).contains(&explain.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "explain.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", explain.temperature),
            });
        }

        if explain.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "explain.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if explain.enabled && explain.api_key.is_none() {
            if self.environment.is_strict() {
                tracing::warn!(
                    "explain.api_key is not set; chat replies will use the rule-based fallback"
                );
            } else {
                tracing::debug!("explain.api_key not set, chat will use the rule-based fallback");
            }
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000)
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: vec![
                endpoints::FRONTEND_DEPLOYED_ORIGIN.to_string(),
                endpoints::FRONTEND_DEV_ORIGIN.to_string(),
            ],
        }
    }
}

/// Which inference strategy to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyMode {
    /// Ensemble when its artifacts are present, else memorizer
    #[default]
    Auto,
    /// TF-IDF + LR/NB ensemble only
    Ensemble,
    /// Memorization tables only
    Memorizer,
}

impl StrategyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyMode::Auto => "auto",
            StrategyMode::Ensemble => "ensemble",
            StrategyMode::Memorizer => "memorizer",
        }
    }
}

/// Artifact bundle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding the artifact files
    #[serde(default = "default_artifact_dir")]
    pub dir: String,

    /// Strategy selection
    #[serde(default)]
    pub strategy: StrategyMode,
}

fn default_artifact_dir() -> String {
    std::env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string())
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
            strategy: StrategyMode::Auto,
        }
    }
}

/// Explanation (chat) collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// Call the language model at all (false = always rule-based)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OpenAI-compatible base URL
    #[serde(default = "default_explain_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_explain_model")]
    pub model: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[serde(default = "default_explain_timeout")]
    pub timeout_seconds: u64,

    /// Maximum tokens in a reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_explain_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}
fn default_explain_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}
fn default_explain_timeout() -> u64 {
    20
}
fn default_max_tokens() -> usize {
    300
}
fn default_temperature() -> f32 {
    0.3
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_explain_endpoint(),
            model: default_explain_model(),
            api_key: default_api_key(),
            timeout_seconds: default_explain_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Platform deployment variables (`PORT`, `MODEL_DIR`)
///
/// Applied on top of every file and `ITEM_PREDICTOR__*` source, so a host
/// that only sets these still wins over the shipped `config/default.*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOverrides {
    pub port: Option<i64>,
    pub model_dir: Option<String>,
}

impl DeployOverrides {
    /// Read the overrides from the process environment.
    ///
    /// An unparseable `PORT` or a blank `MODEL_DIR` is ignored.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.trim().parse().ok()),
            model_dir: std::env::var("MODEL_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty()),
        }
    }
}

/// Load settings from files and environment
///
/// Priority: PORT/MODEL_DIR > env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(config_dir: &str, env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_with(config_dir, env, &DeployOverrides::from_env())
}

/// Load settings with explicit deployment overrides
pub fn load_settings_with(
    config_dir: &str,
    env: Option<&str>,
    overrides: &DeployOverrides,
) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name(&format!("{}/default", config_dir)).required(false));

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&format!("{}/{}", config_dir, env_name)).required(false));
    }

    builder = builder
        .add_source(
            Environment::with_prefix("ITEM_PREDICTOR")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("server.port", overrides.port)?
        .set_override_option("artifacts.dir", overrides.model_dir.clone())?;

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
