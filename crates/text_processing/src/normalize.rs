//! Text normalization
//!
//! Two normalizers are used at training and serving time:
//! - [`normalize_text`] for free-text descriptions
//! - [`normalize_token`] for side-channel values (uom, market) embedded inline

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("static whitespace pattern is valid"));

/// Canonicalize a description.
///
/// Absent → `""`; newlines → spaces; lowercase; trim; every whitespace run
/// collapsed to a single space.
///
/// # Examples
/// ```
/// use item_predictor_text_processing::normalize_text;
/// assert_eq!(normalize_text(Some("  Foo\nBar  ")), "foo bar");
/// assert_eq!(normalize_text(None), "");
/// ```
pub fn normalize_text(s: Option<&str>) -> String {
    let Some(s) = s else {
        return String::new();
    };
    let lowered = s.replace('\n', " ").to_lowercase();
    WHITESPACE_RUN.replace_all(lowered.trim(), " ").into_owned()
}

/// Canonicalize a side-channel token.
///
/// Absent → `""`; trim; lowercase; every whitespace run replaced by `_` so the
/// token never reintroduces whitespace into the composite string.
pub fn normalize_token(s: Option<&str>) -> String {
    let Some(s) = s else {
        return String::new();
    };
    let lowered = s.trim().to_lowercase();
    WHITESPACE_RUN.replace_all(&lowered, "_").into_owned()
}

/// Filter an optional hint down to a present, non-empty value.
///
/// An empty string counts as absent, matching how the hints were treated
/// during training.
pub fn present(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}
