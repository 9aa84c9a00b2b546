//! TF-IDF feature vectorizer
//!
//! Reproduces `TfidfVectorizer.transform` for a single document from the
//! exported vectorizer state. Two vectorizers (word and char) are combined by
//! [`FeatureVectorizer`] into the feature space the classifiers were fit on.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use item_predictor_text_processing::{Analyzer, AnalyzerKind};

use crate::sparse::SparseVector;
use crate::ArtifactError;

/// Row normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Exported vectorizer state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizerState {
    pub analyzer: AnalyzerKind,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub token_pattern: Option<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_true")]
    pub use_idf: bool,
    /// `null` disables normalization
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    pub vocabulary: HashMap<String, usize>,
    #[serde(default)]
    pub idf: Vec<f64>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}
fn default_true() -> bool {
    true
}
fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// A ready-to-use TF-IDF vectorizer
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl TfidfVectorizer {
    /// Validate exported state and compile the analyzer.
    ///
    /// `name` identifies the artifact in error messages.
    pub fn from_state(state: TfidfVectorizerState, name: &str) -> Result<Self, ArtifactError> {
        let analyzer = Analyzer::new(
            state.analyzer,
            state.ngram_range,
            state.lowercase,
            state.token_pattern.as_deref(),
        )
        .map_err(|e| ArtifactError::Invalid(format!("{}: {}", name, e)))?;

        let size = state.vocabulary.len();
        let mut seen = vec![false; size];
        for (term, &idx) in &state.vocabulary {
            if idx >= size {
                return Err(ArtifactError::Invalid(format!(
                    "{}: vocabulary index {} of {:?} out of range for {} terms",
                    name, idx, term, size
                )));
            }
            if std::mem::replace(&mut seen[idx], true) {
                return Err(ArtifactError::Invalid(format!(
                    "{}: vocabulary index {} assigned twice",
                    name, idx
                )));
            }
        }

        let idf = if state.use_idf {
            if state.idf.len() != size {
                return Err(ArtifactError::DimensionMismatch {
                    what: format!("{} idf", name),
                    expected: size,
                    found: state.idf.len(),
                });
            }
            Some(state.idf)
        } else {
            None
        };

        Ok(Self {
            analyzer,
            vocabulary: state.vocabulary,
            idf,
            sublinear_tf: state.sublinear_tf,
            norm: state.norm,
        })
    }

    /// Number of output features
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn analyzer_kind(&self) -> AnalyzerKind {
        self.analyzer.kind()
    }

    /// Vectorize one document
    pub fn transform(&self, doc: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyzer.analyze(doc) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { tf.ln() + 1.0 } else { tf };
                let weight = match &self.idf {
                    Some(idf) => tf * idf[idx],
                    None => tf,
                };
                (idx, weight)
            })
            .collect();

        if let Some(norm) = self.norm {
            normalize(&mut entries, norm);
        }

        SparseVector::new(self.vocabulary_size(), entries)
    }
}

fn normalize(entries: &mut [(usize, f64)], norm: Norm) {
    let total = match norm {
        Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
        Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
    };
    if total == 0.0 {
        return;
    }
    for (_, value) in entries.iter_mut() {
        *value /= total;
    }
}

/// Word features followed by char features
#[derive(Debug, Clone)]
pub struct FeatureVectorizer {
    word: TfidfVectorizer,
    chars: TfidfVectorizer,
}

impl FeatureVectorizer {
    pub fn new(word: TfidfVectorizer, chars: TfidfVectorizer) -> Self {
        Self { word, chars }
    }

    /// Total feature count (word vocabulary + char vocabulary)
    pub fn n_features(&self) -> usize {
        self.word.vocabulary_size() + self.chars.vocabulary_size()
    }

    pub fn word(&self) -> &TfidfVectorizer {
        &self.word
    }

    pub fn chars(&self) -> &TfidfVectorizer {
        &self.chars
    }

    pub fn transform(&self, doc: &str) -> SparseVector {
        self.word.transform(doc).hstack(&self.chars.transform(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_state() -> TfidfVectorizerState {
        serde_json::from_str(
            r#"{
                "analyzer": "word",
                "vocabulary": {"pipe": 0, "valve": 1, "__uom": 2},
                "idf": [1.0, 2.0, 1.5]
            }"#,
        )
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_state_defaults() {
        let state = word_state();
        assert_eq!(state.ngram_range, (1, 1));
        assert!(state.lowercase);
        assert!(state.use_idf);
        assert!(!state.sublinear_tf);
        assert_eq!(state.norm, Some(Norm::L2));
    }

    #[test]
    fn test_tfidf_l2() {
        let vectorizer = TfidfVectorizer::from_state(word_state(), "word").unwrap();
        // counts: pipe=2, __uom=1; "ea" is out of vocabulary
        // weights 2*1.0, 1*1.5; l2 norm 2.5
        let x = vectorizer.transform("pipe pipe __uom=ea");
        let entries: Vec<_> = x.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, 0);
        assert!(approx(entries[0].1, 0.8));
        assert_eq!(entries[1].0, 2);
        assert!(approx(entries[1].1, 0.6));
    }

    #[test]
    fn test_sublinear_tf_without_norm() {
        let mut state = word_state();
        state.sublinear_tf = true;
        state.norm = None;
        let vectorizer = TfidfVectorizer::from_state(state, "word").unwrap();

        let x = vectorizer.transform("pipe pipe valve").to_dense();
        assert!(approx(x[0], 1.0 + 2f64.ln()));
        assert!(approx(x[1], 2.0));
        assert!(approx(x[2], 0.0));
    }

    #[test]
    fn test_l1_norm_without_idf() {
        let mut state = word_state();
        state.use_idf = false;
        state.idf.clear();
        state.norm = Some(Norm::L1);
        let vectorizer = TfidfVectorizer::from_state(state, "word").unwrap();

        let x = vectorizer.transform("pipe valve valve valve").to_dense();
        assert!(approx(x[0], 0.25));
        assert!(approx(x[1], 0.75));
    }

    #[test]
    fn test_out_of_vocabulary_is_zero_vector() {
        let vectorizer = TfidfVectorizer::from_state(word_state(), "word").unwrap();
        let x = vectorizer.transform("gasket");
        assert!(x.is_empty());
        assert_eq!(x.dim(), 3);
    }

    #[test]
    fn test_idf_length_mismatch_rejected() {
        let mut state = word_state();
        state.idf.pop();
        assert!(matches!(
            TfidfVectorizer::from_state(state, "word"),
            Err(ArtifactError::DimensionMismatch { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn test_vocabulary_index_out_of_range_rejected() {
        let mut state = word_state();
        state.vocabulary.insert("pipe".into(), 7);
        assert!(matches!(
            TfidfVectorizer::from_state(state, "word"),
            Err(ArtifactError::Invalid(_))
        ));
    }

    #[test]
    fn test_feature_vectorizer_offsets_char_features() {
        let word = TfidfVectorizer::from_state(word_state(), "word").unwrap();
        let char_state: TfidfVectorizerState = serde_json::from_str(
            r#"{
                "analyzer": "char_wb",
                "ngram_range": [3, 3],
                "norm": null,
                "use_idf": false,
                "vocabulary": {" pi": 0, "pe ": 1}
            }"#,
        )
        .unwrap();
        let chars = TfidfVectorizer::from_state(char_state, "char").unwrap();
        let features = FeatureVectorizer::new(word, chars);

        assert_eq!(features.n_features(), 5);
        let x = features.transform("pipe");
        assert_eq!(
            x.iter().collect::<Vec<_>>(),
            vec![(0, 1.0), (3, 1.0), (4, 1.0)]
        );
    }
}
