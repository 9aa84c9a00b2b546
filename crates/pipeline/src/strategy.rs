//! Inference strategies
//!
//! Both strategies resolve an item identifier their own way and share the
//! quantity estimator. One is chosen at startup by [`build_predictor`].

use std::sync::Arc;

use item_predictor_config::StrategyMode;
use item_predictor_core::{ItemPredictor, ItemSource, Prediction};

use crate::artifacts::ArtifactBundle;
use crate::ensemble::EnsembleModel;
use crate::memorizer::MemoTables;
use crate::quantity::QuantityEstimator;
use crate::ArtifactError;

/// TF-IDF features through the LR + NB ensemble
#[derive(Debug, Clone)]
pub struct EnsemblePredictor {
    model: Arc<EnsembleModel>,
    quantity: Arc<QuantityEstimator>,
    global_mode: i64,
}

impl EnsemblePredictor {
    pub fn new(bundle: &ArtifactBundle) -> Result<Self, ArtifactError> {
        let model = bundle.ensemble().cloned().ok_or_else(|| {
            ArtifactError::NoStrategy("ensemble artifacts are not loaded".to_string())
        })?;
        Ok(Self {
            model,
            quantity: Arc::clone(bundle.quantity()),
            global_mode: bundle.global_mode(),
        })
    }
}

impl ItemPredictor for EnsemblePredictor {
    fn predict(&self, description: &str, uom: Option<&str>, core_market: Option<&str>) -> Prediction {
        let (item, item_source) =
            self.model
                .resolve_item(description, uom, core_market, self.global_mode);
        let estimate = self.quantity.estimate(item, uom);

        tracing::debug!(
            item,
            quantity = estimate.quantity,
            item_source = item_source.as_str(),
            quantity_source = estimate.source.as_str(),
            "Ensemble prediction"
        );

        Prediction {
            item,
            quantity: estimate.quantity,
            item_source,
            quantity_source: estimate.source,
        }
    }

    fn name(&self) -> &'static str {
        "ensemble"
    }
}

/// Exact-match memorization tiers
#[derive(Debug, Clone)]
pub struct MemorizerPredictor {
    tables: Arc<MemoTables>,
    quantity: Arc<QuantityEstimator>,
    global_mode: i64,
}

impl MemorizerPredictor {
    pub fn new(bundle: &ArtifactBundle) -> Result<Self, ArtifactError> {
        let tables = bundle.memo().cloned().ok_or_else(|| {
            ArtifactError::NoStrategy("memorization tables are not loaded".to_string())
        })?;
        Ok(Self {
            tables,
            quantity: Arc::clone(bundle.quantity()),
            global_mode: bundle.global_mode(),
        })
    }
}

impl ItemPredictor for MemorizerPredictor {
    fn predict(&self, description: &str, uom: Option<&str>, core_market: Option<&str>) -> Prediction {
        let (item, item_source) = match self.tables.lookup(description, uom, core_market) {
            Some((item, tier)) => (item, ItemSource::Memo(tier)),
            None => (self.global_mode, ItemSource::GlobalMode),
        };
        let estimate = self.quantity.estimate(item, uom);

        tracing::debug!(
            item,
            quantity = estimate.quantity,
            item_source = item_source.as_str(),
            quantity_source = estimate.source.as_str(),
            "Memorizer prediction"
        );

        Prediction {
            item,
            quantity: estimate.quantity,
            item_source,
            quantity_source: estimate.source,
        }
    }

    fn name(&self) -> &'static str {
        "memorizer"
    }
}

/// Select the serving strategy for a loaded bundle
pub fn build_predictor(
    bundle: &ArtifactBundle,
    mode: StrategyMode,
) -> Result<Arc<dyn ItemPredictor>, ArtifactError> {
    let predictor: Arc<dyn ItemPredictor> = match mode {
        StrategyMode::Ensemble => Arc::new(EnsemblePredictor::new(bundle)?),
        StrategyMode::Memorizer => Arc::new(MemorizerPredictor::new(bundle)?),
        StrategyMode::Auto => {
            if bundle.ensemble().is_some() {
                Arc::new(EnsemblePredictor::new(bundle)?)
            } else if bundle.memo().is_some() {
                Arc::new(MemorizerPredictor::new(bundle)?)
            } else {
                return Err(ArtifactError::NoStrategy(
                    "neither ensemble artifacts nor memorization tables were found".to_string(),
                ));
            }
        }
    };

    tracing::info!(strategy = predictor.name(), mode = mode.as_str(), "Selected inference strategy");
    Ok(predictor)
}
