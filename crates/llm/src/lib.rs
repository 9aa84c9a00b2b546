//! Explanation collaborator for the item predictor
//!
//! Features:
//! - OpenAI-compatible chat completions backend
//! - Prompt builder carrying the latest prediction as context
//! - Deterministic rule-based replies when the model is unavailable

pub mod backend;
pub mod explainer;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend, OpenAIBackend, OpenAIConfig};
pub use explainer::{ExplanationService, RuleBasedExplainer};
pub use prompt::{describe_record, Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
