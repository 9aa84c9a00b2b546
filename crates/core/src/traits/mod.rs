//! Core traits for the item predictor
//!
//! ```text
//! Inference:
//!   - ItemPredictor: (description, uom, core_market) → Prediction
//!
//! Collaborators:
//!   - Explainer: chat reply about the last prediction, never fails
//! ```

mod explainer;
mod predictor;

pub use explainer::Explainer;
pub use predictor::ItemPredictor;
