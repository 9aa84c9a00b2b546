//! Quantity estimation from ratio priors
//!
//! Resolution order for a predicted item:
//! 1. `(item, uom)` ratio, when a uom is given and the ratio is finite
//! 2. `item` ratio, when finite
//! 3. global ratio
//!
//! The ratio is scaled by the extended-quantity factor; a result that is not
//! finite and positive falls back to the item's median quantity, then to 1.0.

use std::collections::HashMap;

use item_predictor_config::constants::quantity::{EXTENDED_QUANTITY_FACTOR, QUANTITY_FLOOR};
use item_predictor_core::QuantitySource;
use item_predictor_text_processing::present;

use crate::label::parse_item_key;

/// Prior tables as exported; `null` ratios load as `None`
#[derive(Debug, Clone, Default)]
pub struct PriorTablesState {
    pub ratio_item_uom: HashMap<String, HashMap<String, Option<f64>>>,
    pub ratio_item: HashMap<String, Option<f64>>,
    pub ratio_global: Option<f64>,
    pub item_qty_median: HashMap<String, Option<f64>>,
}

/// Estimated quantity and the tier that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantityEstimate {
    pub quantity: f64,
    pub source: QuantitySource,
}

#[derive(Debug, Clone, Default)]
pub struct QuantityEstimator {
    item_uom: HashMap<i64, HashMap<String, f64>>,
    item: HashMap<i64, f64>,
    global: f64,
    median: HashMap<i64, f64>,
    dropped_keys: usize,
}

impl QuantityEstimator {
    /// Build from exported tables.
    ///
    /// Keys that are not canonical integers are dropped and counted.
    pub fn from_state(state: PriorTablesState) -> Self {
        let mut dropped_keys = 0;

        let mut item_uom: HashMap<i64, HashMap<String, f64>> = HashMap::new();
        for (key, by_uom) in state.ratio_item_uom {
            match parse_item_key(&key) {
                Some(item) => {
                    let entry = item_uom.entry(item).or_default();
                    for (uom, ratio) in by_uom {
                        entry.insert(uom, ratio.unwrap_or(f64::NAN));
                    }
                }
                None => dropped_keys += 1,
            }
        }

        let item = typed_table(state.ratio_item, &mut dropped_keys);
        let median = typed_table(state.item_qty_median, &mut dropped_keys);

        if dropped_keys > 0 {
            tracing::warn!(
                dropped_keys,
                "Dropped prior-table keys that are not integer item identifiers"
            );
        }

        Self {
            item_uom,
            item,
            global: state.ratio_global.unwrap_or(f64::NAN),
            median,
            dropped_keys,
        }
    }

    pub fn dropped_keys(&self) -> usize {
        self.dropped_keys
    }

    pub fn item_uom_entries(&self) -> usize {
        self.item_uom.values().map(HashMap::len).sum()
    }

    pub fn item_entries(&self) -> usize {
        self.item.len()
    }

    pub fn median_entries(&self) -> usize {
        self.median.len()
    }

    pub fn global_ratio(&self) -> f64 {
        self.global
    }

    /// Estimate with the standard extended-quantity factor
    pub fn estimate(&self, item: i64, uom: Option<&str>) -> QuantityEstimate {
        self.estimate_with_factor(item, uom, EXTENDED_QUANTITY_FACTOR)
    }

    /// Estimate with a caller-supplied factor applied to the resolved ratio
    pub fn estimate_with_factor(&self, item: i64, uom: Option<&str>, factor: f64) -> QuantityEstimate {
        let (ratio, source) = self.resolve_ratio(item, uom);
        let quantity = ratio * factor;
        if quantity.is_finite() && quantity > 0.0 {
            return QuantityEstimate { quantity, source };
        }

        match self.median.get(&item).copied().filter(|m| m.is_finite() && *m > 0.0) {
            Some(median) => QuantityEstimate {
                quantity: median,
                source: QuantitySource::ItemMedian,
            },
            None => {
                tracing::debug!(item, ratio, "No usable quantity prior or median, using floor");
                QuantityEstimate {
                    quantity: QUANTITY_FLOOR,
                    source: QuantitySource::Floor,
                }
            }
        }
    }

    fn resolve_ratio(&self, item: i64, uom: Option<&str>) -> (f64, QuantitySource) {
        if let Some(uom) = present(uom) {
            let ratio = self
                .item_uom
                .get(&item)
                .and_then(|by_uom| by_uom.get(uom))
                .copied()
                .filter(|r| r.is_finite());
            if let Some(ratio) = ratio {
                return (ratio, QuantitySource::ItemUomPrior);
            }
        }

        if let Some(ratio) = self.item.get(&item).copied().filter(|r| r.is_finite()) {
            return (ratio, QuantitySource::ItemPrior);
        }

        (self.global, QuantitySource::GlobalPrior)
    }
}

fn typed_table(raw: HashMap<String, Option<f64>>, dropped: &mut usize) -> HashMap<i64, f64> {
    let mut table = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        match parse_item_key(&key) {
            Some(item) => {
                table.insert(item, value.unwrap_or(f64::NAN));
            }
            None => *dropped += 1,
        }
    }
    table
}
