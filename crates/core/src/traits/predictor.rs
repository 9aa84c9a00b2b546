//! Inference strategy trait

use crate::Prediction;

/// One inference strategy over an immutable artifact bundle.
///
/// Implementations:
/// - `EnsemblePredictor` - TF-IDF features, weighted LR + NB ensemble
/// - `MemorizerPredictor` - exact-match lookup tiers
///
/// Calls are pure and synchronous: the same inputs always yield the same
/// prediction, and no call mutates shared state, so one instance is shared
/// across all request handlers without locking.
pub trait ItemPredictor: Send + Sync + 'static {
    /// Predict an item and its expected quantity.
    ///
    /// Never fails: missing or corrupt table entries are absorbed by the
    /// fallback tiers recorded in the returned `Prediction`.
    fn predict(&self, description: &str, uom: Option<&str>, core_market: Option<&str>)
        -> Prediction;

    /// Strategy name for logging and metrics
    fn name(&self) -> &'static str;
}
