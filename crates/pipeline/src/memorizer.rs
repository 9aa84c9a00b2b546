//! Exact-match memorization tables

use std::collections::HashMap;

use serde::Deserialize;

use item_predictor_core::MemoTier;
use item_predictor_text_processing::{normalize_text, normalize_token};

use crate::label::RawLabel;

/// One exported memorization entry
#[derive(Debug, Clone, Deserialize)]
pub struct MemoEntry {
    pub description: String,
    #[serde(default)]
    pub uom: Option<String>,
    #[serde(default)]
    pub core_market: Option<String>,
    pub item: RawLabel,
}

/// The three tiers, keyed by normalized fields
#[derive(Debug, Clone, Default)]
pub struct MemoTables {
    by_desc_uom_market: HashMap<(String, String, String), i64>,
    by_desc_uom: HashMap<(String, String), i64>,
    by_desc: HashMap<String, i64>,
    dropped_entries: usize,
}

impl MemoTables {
    /// Build the tiers from exported entries, most specific tier first.
    ///
    /// Keys are normalized again so tables exported with raw text still
    /// match. Entries whose item does not decode are dropped; on duplicate
    /// keys the later entry wins.
    pub fn from_entries(
        desc_uom_market: Vec<MemoEntry>,
        desc_uom: Vec<MemoEntry>,
        desc: Vec<MemoEntry>,
    ) -> Self {
        let mut tables = Self::default();

        for entry in desc_uom_market {
            if let Some(item) = tables.decode(&entry) {
                let key = (
                    normalize_text(Some(&entry.description)),
                    normalize_token(entry.uom.as_deref()),
                    normalize_token(entry.core_market.as_deref()),
                );
                tables.by_desc_uom_market.insert(key, item);
            }
        }
        for entry in desc_uom {
            if let Some(item) = tables.decode(&entry) {
                let key = (
                    normalize_text(Some(&entry.description)),
                    normalize_token(entry.uom.as_deref()),
                );
                tables.by_desc_uom.insert(key, item);
            }
        }
        for entry in desc {
            if let Some(item) = tables.decode(&entry) {
                tables
                    .by_desc
                    .insert(normalize_text(Some(&entry.description)), item);
            }
        }

        if tables.dropped_entries > 0 {
            tracing::warn!(
                dropped = tables.dropped_entries,
                "Dropped memorization entries with non-numeric items"
            );
        }

        tables
    }

    fn decode(&mut self, entry: &MemoEntry) -> Option<i64> {
        let item = entry.item.decode().item();
        if item.is_none() {
            self.dropped_entries += 1;
        }
        item
    }

    pub fn tier_len(&self, tier: MemoTier) -> usize {
        match tier {
            MemoTier::DescriptionUomMarket => self.by_desc_uom_market.len(),
            MemoTier::DescriptionUom => self.by_desc_uom.len(),
            MemoTier::Description => self.by_desc.len(),
        }
    }

    pub fn dropped_entries(&self) -> usize {
        self.dropped_entries
    }

    /// Search the tiers in [`MemoTier::LOOKUP_ORDER`]; the first hit wins
    pub fn lookup(
        &self,
        description: &str,
        uom: Option<&str>,
        core_market: Option<&str>,
    ) -> Option<(i64, MemoTier)> {
        let key = (
            normalize_text(Some(description)),
            normalize_token(uom),
            normalize_token(core_market),
        );

        MemoTier::LOOKUP_ORDER
            .into_iter()
            .find_map(|tier| self.tier_item(tier, &key).map(|item| (item, tier)))
    }

    fn tier_item(&self, tier: MemoTier, key: &(String, String, String)) -> Option<i64> {
        match tier {
            MemoTier::DescriptionUomMarket => self.by_desc_uom_market.get(key),
            MemoTier::DescriptionUom => self.by_desc_uom.get(&(key.0.clone(), key.1.clone())),
            MemoTier::Description => self.by_desc.get(&key.0),
        }
        .copied()
    }
}
