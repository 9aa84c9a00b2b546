//! Meta-feature composition
//!
//! The vectorizers and classifiers were fit on descriptions augmented with
//! inline side-channel tokens. Segment order and separators are part of that
//! contract: reordering or dropping one degrades accuracy without any error.

use item_predictor_config::constants::meta;

use crate::normalize::{normalize_text, normalize_token, present};

/// Build the composite text for one request.
///
/// Layout:
/// `<description>[ __uom=<uom>][ __core_market=<market>] __memo_tier=none`
pub fn compose_meta_text(description: &str, uom: Option<&str>, core_market: Option<&str>) -> String {
    let mut text = normalize_text(Some(description));

    if let Some(uom) = present(uom) {
        text.push_str(meta::UOM_PREFIX);
        text.push_str(&normalize_token(Some(uom)));
    }
    if let Some(market) = present(core_market) {
        text.push_str(meta::CORE_MARKET_PREFIX);
        text.push_str(&normalize_token(Some(market)));
    }
    text.push_str(meta::MEMO_TIER_MARKER);

    text
}
