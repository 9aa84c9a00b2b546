//! Prediction results and their fallback provenance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Memorization tier, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoTier {
    /// `(description, uom, core_market)`
    DescriptionUomMarket,
    /// `(description, uom)`
    DescriptionUom,
    /// `description` alone
    Description,
}

impl MemoTier {
    /// All tiers in lookup order
    pub const LOOKUP_ORDER: [MemoTier; 3] = [
        MemoTier::DescriptionUomMarket,
        MemoTier::DescriptionUom,
        MemoTier::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoTier::DescriptionUomMarket => "desc_uom_market",
            MemoTier::DescriptionUom => "desc_uom",
            MemoTier::Description => "desc",
        }
    }
}

/// Where the item identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tier")]
pub enum ItemSource {
    /// Ensemble argmax decoded to a numeric label
    Classifier,
    /// Exact match in a memorization tier
    Memo(MemoTier),
    /// Global mode item (undecodable label or every memo tier missed)
    GlobalMode,
}

impl ItemSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSource::Classifier => "classifier",
            ItemSource::Memo(tier) => tier.as_str(),
            ItemSource::GlobalMode => "global_mode",
        }
    }

    /// True when the item came from a fallback rather than a direct match
    pub fn is_fallback(&self) -> bool {
        matches!(self, ItemSource::GlobalMode)
    }
}

/// Which tier of the quantity chain produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantitySource {
    /// `(item, uom)` prior
    ItemUomPrior,
    /// `item` prior
    ItemPrior,
    /// Global ratio scalar
    GlobalPrior,
    /// Per-item median override
    ItemMedian,
    /// Absolute floor of 1.0
    Floor,
}

impl QuantitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantitySource::ItemUomPrior => "item_uom_prior",
            QuantitySource::ItemPrior => "item_prior",
            QuantitySource::GlobalPrior => "global_prior",
            QuantitySource::ItemMedian => "item_median",
            QuantitySource::Floor => "floor",
        }
    }
}

impl fmt::Display for QuantitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one inference call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Catalog item identifier (`MasterItemNo`)
    pub item: i64,
    /// Expected shipped quantity (`QtyShipped`), always finite and positive
    pub quantity: f64,
    pub item_source: ItemSource,
    pub quantity_source: QuantitySource,
}

impl Prediction {
    /// `(item_identifier, quantity)` pair as exposed to callers
    pub fn into_tuple(self) -> (i64, f64) {
        (self.item, self.quantity)
    }
}

/// A served prediction together with the inputs that produced it.
///
/// Held by the server as opaque context for the chat collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub description: String,
    pub uom: Option<String>,
    pub core_market: Option<String>,
    pub prediction: Prediction,
    /// Strategy that served the call (`ensemble`, `memorizer`)
    pub strategy: String,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(
        description: impl Into<String>,
        uom: Option<String>,
        core_market: Option<String>,
        prediction: Prediction,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            uom,
            core_market,
            prediction,
            strategy: strategy.into(),
            created_at: Utc::now(),
        }
    }
}

/// Where a chat reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationSource {
    Llm,
    Fallback,
}

impl ExplanationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationSource::Llm => "llm",
            ExplanationSource::Fallback => "fallback",
        }
    }
}

/// Chat reply, possibly degraded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub reply: String,
    pub source: ExplanationSource,
    /// Detail of the collaborator failure when `source` is `Fallback`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Explanation {
    pub fn from_llm(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            source: ExplanationSource::Llm,
            error: None,
        }
    }

    pub fn fallback(reply: impl Into<String>, error: Option<String>) -> Self {
        Self {
            reply: reply.into(),
            source: ExplanationSource::Fallback,
            error,
        }
    }
}
