//! Core traits and types for the item predictor
//!
//! This crate provides foundational types used across all other crates:
//! - The `ItemPredictor` strategy trait (TF-IDF ensemble, memorizer)
//! - The `Explainer` trait for the chat collaborator
//! - Prediction results with fallback provenance

pub mod prediction;
pub mod traits;

pub use prediction::{
    Explanation, ExplanationSource, ItemSource, MemoTier, Prediction, PredictionRecord,
    QuantitySource,
};
pub use traits::{Explainer, ItemPredictor};
