//! Item label parsing
//!
//! Item identifiers travel as strings in the exported artifacts (label
//! encoder classes, table keys). Two parsing rules apply:
//! - labels decode like `int(float(s))`: `"123"`, `"123.0"`, `" 1e3 "` are items
//! - table keys must round-trip exactly through `i64::to_string`

use serde::Deserialize;
use std::fmt;

/// Outcome of decoding a class label
#[derive(Debug, Clone, PartialEq)]
pub enum LabelDecode {
    Parsed(i64),
    /// Label is not numeric (or the class index has no label)
    Unparseable(String),
}

impl LabelDecode {
    pub fn item(&self) -> Option<i64> {
        match self {
            LabelDecode::Parsed(item) => Some(*item),
            LabelDecode::Unparseable(_) => None,
        }
    }
}

/// Decode a label string to an item identifier.
///
/// Parses as a float, rejects non-finite values, truncates toward zero and
/// requires the result to fit in `i64`.
pub fn decode_label(label: &str) -> LabelDecode {
    match parse_item_label(label) {
        Some(item) => LabelDecode::Parsed(item),
        None => LabelDecode::Unparseable(label.to_string()),
    }
}

pub(crate) fn parse_item_label(label: &str) -> Option<i64> {
    let value: f64 = label.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Parse a table key that must be the canonical string form of an `i64`
pub(crate) fn parse_item_key(key: &str) -> Option<i64> {
    let item: i64 = key.parse().ok()?;
    (item.to_string() == key).then_some(item)
}

/// A label as it may appear in JSON: string or number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawLabel {
    pub fn decode(&self) -> LabelDecode {
        match self {
            RawLabel::Int(item) => LabelDecode::Parsed(*item),
            RawLabel::Float(value) => decode_label(&value.to_string()),
            RawLabel::Text(text) => decode_label(text),
        }
    }
}

impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLabel::Int(item) => write!(f, "{}", item),
            RawLabel::Float(value) => write!(f, "{}", value),
            RawLabel::Text(text) => f.write_str(text),
        }
    }
}
