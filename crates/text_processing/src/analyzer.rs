//! TF-IDF analyzers
//!
//! Term extraction compatible with scikit-learn's `TfidfVectorizer`
//! analyzers, so a vocabulary exported from training maps to the same
//! feature indices at serving time:
//! - `word`: regex tokens, then word n-grams joined by a single space
//! - `char`: character n-grams over the whole (space-collapsed) document
//! - `char_wb`: character n-grams inside space-padded words
//!
//! N-grams are taken over Unicode scalar values, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Result, TextProcessingError};

/// scikit-learn's default `token_pattern`
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

// Runs of two or more whitespace characters; a single tab stays a tab.
static MULTI_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\s+").expect("static whitespace pattern is valid"));

/// Analyzer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Word,
    Char,
    CharWb,
}

/// Extracts the terms of one document
#[derive(Debug, Clone)]
pub struct Analyzer {
    kind: AnalyzerKind,
    min_n: usize,
    max_n: usize,
    lowercase: bool,
    token_pattern: Regex,
}

impl Analyzer {
    /// Create an analyzer.
    ///
    /// `token_pattern` only applies to `Word`; `None` uses the sklearn default.
    pub fn new(
        kind: AnalyzerKind,
        ngram_range: (usize, usize),
        lowercase: bool,
        token_pattern: Option<&str>,
    ) -> Result<Self> {
        let (min_n, max_n) = ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(TextProcessingError::InvalidNgramRange(min_n, max_n));
        }

        let pattern = token_pattern.unwrap_or(DEFAULT_TOKEN_PATTERN);
        let token_pattern =
            Regex::new(pattern).map_err(|e| TextProcessingError::InvalidTokenPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            kind,
            min_n,
            max_n,
            lowercase,
            token_pattern,
        })
    }

    pub fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        (self.min_n, self.max_n)
    }

    /// All terms of `doc`, with repetitions (order is not significant)
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let doc = if self.lowercase {
            doc.to_lowercase()
        } else {
            doc.to_string()
        };

        match self.kind {
            AnalyzerKind::Word => self.word_ngrams(&doc),
            AnalyzerKind::Char => self.char_ngrams(&doc),
            AnalyzerKind::CharWb => self.char_wb_ngrams(&doc),
        }
    }

    fn word_ngrams(&self, doc: &str) -> Vec<String> {
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(doc)
            .map(|m| m.as_str())
            .collect();

        let mut terms = Vec::new();
        for n in self.min_n..=self.max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    fn char_ngrams(&self, doc: &str) -> Vec<String> {
        let collapsed = MULTI_WHITESPACE.replace_all(doc, " ");
        let chars: Vec<char> = collapsed.chars().collect();

        let mut terms = Vec::new();
        for n in self.min_n..=self.max_n.min(chars.len()) {
            for window in chars.windows(n) {
                terms.push(window.iter().collect());
            }
        }
        terms
    }

    fn char_wb_ngrams(&self, doc: &str) -> Vec<String> {
        let collapsed = MULTI_WHITESPACE.replace_all(doc, " ");

        let mut terms = Vec::new();
        for word in collapsed.split_whitespace() {
            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();

            for n in self.min_n..=self.max_n {
                if padded.len() <= n {
                    // Short word: counted once as a whole, larger n add nothing
                    terms.push(padded.iter().collect());
                    break;
                }
                for window in padded.windows(n) {
                    terms.push(window.iter().collect());
                }
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_word_unigrams_drop_single_chars() {
        let analyzer = Analyzer::new(AnalyzerKind::Word, (1, 1), true, None).unwrap();
        assert_eq!(
            analyzer.analyze("Pipe A 3/4 __uom=ea"),
            vec!["pipe", "__uom", "ea"]
        );
    }

    #[test]
    fn test_word_bigrams() {
        let analyzer = Analyzer::new(AnalyzerKind::Word, (1, 2), true, None).unwrap();
        assert_eq!(
            sorted(analyzer.analyze("copper pipe fitting")),
            sorted(vec![
                "copper".into(),
                "pipe".into(),
                "fitting".into(),
                "copper pipe".into(),
                "pipe fitting".into(),
            ])
        );
    }

    #[test]
    fn test_word_ngrams_longer_than_document() {
        let analyzer = Analyzer::new(AnalyzerKind::Word, (2, 3), true, None).unwrap();
        assert!(analyzer.analyze("valve").is_empty());
    }

    #[test]
    fn test_char_ngrams() {
        let analyzer = Analyzer::new(AnalyzerKind::Char, (2, 3), false, None).unwrap();
        assert_eq!(
            sorted(analyzer.analyze("ab  c")),
            sorted(vec![
                "ab".into(),
                "b ".into(),
                " c".into(),
                "ab ".into(),
                "b c".into(),
            ])
        );
    }

    #[test]
    fn test_char_wb_ngrams() {
        let analyzer = Analyzer::new(AnalyzerKind::CharWb, (2, 3), false, None).unwrap();
        assert_eq!(
            sorted(analyzer.analyze("ab")),
            sorted(vec![
                " a".into(),
                "ab".into(),
                "b ".into(),
                " ab".into(),
                "ab ".into(),
            ])
        );
    }

    #[test]
    fn test_char_wb_short_word_counted_once() {
        let analyzer = Analyzer::new(AnalyzerKind::CharWb, (3, 5), false, None).unwrap();
        // " a " has length 3: emitted once for n = 3, nothing for n = 4 or 5
        assert_eq!(analyzer.analyze("a"), vec![" a ".to_string()]);
    }

    #[test]
    fn test_char_ngrams_are_unicode_aware() {
        let analyzer = Analyzer::new(AnalyzerKind::Char, (1, 1), true, None).unwrap();
        assert_eq!(analyzer.analyze("É°"), vec!["é", "°"]);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(Analyzer::new(AnalyzerKind::Word, (0, 1), true, None).is_err());
        assert!(Analyzer::new(AnalyzerKind::Word, (3, 2), true, None).is_err());
        assert!(matches!(
            Analyzer::new(AnalyzerKind::Word, (1, 1), true, Some("(")),
            Err(TextProcessingError::InvalidTokenPattern { .. })
        ));
    }

    #[test]
    fn test_kind_deserialization() {
        let kind: AnalyzerKind = serde_json::from_str("\"char_wb\"").unwrap();
        assert_eq!(kind, AnalyzerKind::CharWb);
    }
}
