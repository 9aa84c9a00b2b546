//! Text processing for the item predictor
//!
//! This crate owns every string transformation that must match training
//! byte-for-byte:
//! - **Normalization**: canonical description text and side-channel tokens
//! - **Composition**: the meta-augmented text fed to the vectorizers
//! - **Analysis**: sklearn-compatible word / char / char_wb n-gram analyzers
//!
//! # Example
//!
//! ```
//! use item_predictor_text_processing::compose_meta_text;
//!
//! let text = compose_meta_text("Pipe  Fitting", Some("EA"), Some("East"));
//! assert_eq!(text, "pipe fitting __uom=ea __core_market=east __memo_tier=none");
//! ```

pub mod analyzer;
pub mod compose;
pub mod normalize;

pub use analyzer::{Analyzer, AnalyzerKind, DEFAULT_TOKEN_PATTERN};
pub use compose::compose_meta_text;
pub use normalize::{normalize_text, normalize_token, present};

use thiserror::Error;

/// Text processing errors
#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Invalid token pattern '{pattern}': {message}")]
    InvalidTokenPattern { pattern: String, message: String },

    #[error("Invalid n-gram range ({0}, {1})")]
    InvalidNgramRange(usize, usize),
}

pub type Result<T> = std::result::Result<T, TextProcessingError>;
