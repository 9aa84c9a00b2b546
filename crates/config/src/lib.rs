//! Configuration management for the item predictor
//!
//! Supports loading configuration from:
//! - YAML/TOML/JSON files (`config/default.*`, `config/{env}.*`)
//! - Environment variables (`ITEM_PREDICTOR__` prefix, `__` separator)
//!
//! Artifact file names and the fixed inference constants live in
//! [`constants`] so training-time contracts are spelled out in one place.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, load_settings_with, ArtifactConfig, DeployOverrides,
    ExplainConfig, ObservabilityConfig, RuntimeEnvironment, ServerConfig, Settings, StrategyMode,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
