//! Inference pipeline for the item predictor
//!
//! This crate turns a trained artifact bundle into predictions:
//! - Artifact store (bundle loading and load-time validation)
//! - TF-IDF feature vectorizer (word + char features, hstacked)
//! - Logistic-regression and naive-Bayes classifiers
//! - Weighted classification ensemble with label decoding
//! - Tiered quantity estimation from ratio priors
//! - Exact-match memorizer
//! - Strategy selection behind the `ItemPredictor` trait

pub mod artifacts;
pub mod classifier;
pub mod ensemble;
pub mod label;
pub mod memorizer;
pub mod quantity;
pub mod sparse;
pub mod strategy;
pub mod vectorizer;

// Artifact exports
pub use artifacts::{ArtifactBundle, ArtifactManifest};

// Model exports
pub use classifier::{LogisticRegression, MultiClass, NaiveBayes, NaiveBayesKind};
pub use ensemble::{argmax, combine_probabilities, EnsembleModel, LabelDecoder};
pub use label::{decode_label, LabelDecode};
pub use sparse::SparseVector;
pub use vectorizer::{FeatureVectorizer, Norm, TfidfVectorizer};

// Lookup exports
pub use memorizer::MemoTables;
pub use quantity::{QuantityEstimate, QuantityEstimator};

// Strategy exports
pub use strategy::{build_predictor, EnsemblePredictor, MemorizerPredictor};

use std::path::PathBuf;
use thiserror::Error;

/// Artifact loading errors. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Missing artifact file: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid artifact: {0}")]
    Invalid(String),

    #[error("No inference strategy available: {0}")]
    NoStrategy(String),
}
