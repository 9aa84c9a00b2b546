//! Classification ensemble
//!
//! Combines logistic-regression and naive-Bayes probabilities with fixed
//! weights, picks the best class and decodes it to an item identifier.

use std::collections::HashSet;

use ndarray::Array1;
use serde::Deserialize;

use item_predictor_config::constants::ensemble::{LR_WEIGHT, NB_WEIGHT};
use item_predictor_core::ItemSource;
use item_predictor_text_processing::compose_meta_text;

use crate::classifier::{LogisticRegression, NaiveBayes};
use crate::label::{LabelDecode, RawLabel};
use crate::vectorizer::FeatureVectorizer;
use crate::ArtifactError;

/// `0.7 × lr + 0.3 × nb`, element-wise
pub fn combine_probabilities(lr: &Array1<f64>, nb: &Array1<f64>) -> Array1<f64> {
    lr * LR_WEIGHT + nb * NB_WEIGHT
}

/// Index of the largest value; ties keep the lowest index.
///
/// Returns 0 for an empty slice.
pub fn argmax(values: &Array1<f64>) -> usize {
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = idx;
        }
    }
    best
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoderState {
    pub classes: Vec<RawLabel>,
}

/// Class index → item label
#[derive(Debug, Clone)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    pub fn from_state(state: LabelEncoderState) -> Result<Self, ArtifactError> {
        let classes: Vec<String> = state.classes.iter().map(ToString::to_string).collect();

        let mut seen = HashSet::with_capacity(classes.len());
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ArtifactError::Invalid(format!(
                "label encoder class {:?} appears more than once",
                dup
            )));
        }

        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn decode(&self, index: usize) -> LabelDecode {
        match self.classes.get(index) {
            Some(label) => crate::label::decode_label(label),
            None => LabelDecode::Unparseable(format!("<class index {}>", index)),
        }
    }
}

/// Vectorizer + classifiers + decoder, checked for dimensional consistency
#[derive(Debug, Clone)]
pub struct EnsembleModel {
    vectorizer: FeatureVectorizer,
    lr: LogisticRegression,
    nb: NaiveBayes,
    decoder: LabelDecoder,
}

impl EnsembleModel {
    pub fn new(
        vectorizer: FeatureVectorizer,
        lr: LogisticRegression,
        nb: NaiveBayes,
        decoder: LabelDecoder,
    ) -> Result<Self, ArtifactError> {
        let n_features = vectorizer.n_features();
        check_dim("lr features", n_features, lr.n_features())?;
        check_dim("nb features", n_features, nb.n_features())?;

        let n_classes = decoder.len();
        check_dim("lr classes", n_classes, lr.n_classes())?;
        check_dim("nb classes", n_classes, nb.n_classes())?;

        Ok(Self {
            vectorizer,
            lr,
            nb,
            decoder,
        })
    }

    pub fn vectorizer(&self) -> &FeatureVectorizer {
        &self.vectorizer
    }

    pub fn n_classes(&self) -> usize {
        self.decoder.len()
    }

    /// Combined class probabilities for one composite text
    pub fn predict_proba(&self, meta_text: &str) -> Array1<f64> {
        let x = self.vectorizer.transform(meta_text);
        combine_probabilities(&self.lr.predict_proba(&x), &self.nb.predict_proba(&x))
    }

    /// Best class for one composite text, decoded
    pub fn classify(&self, meta_text: &str) -> LabelDecode {
        let proba = self.predict_proba(meta_text);
        self.decoder.decode(argmax(&proba))
    }

    /// Resolve the item for raw request fields, substituting `global_mode`
    /// when the winning label does not decode.
    pub fn resolve_item(
        &self,
        description: &str,
        uom: Option<&str>,
        core_market: Option<&str>,
        global_mode: i64,
    ) -> (i64, ItemSource) {
        let meta_text = compose_meta_text(description, uom, core_market);
        match self.classify(&meta_text) {
            LabelDecode::Parsed(item) => (item, ItemSource::Classifier),
            LabelDecode::Unparseable(label) => {
                tracing::debug!(label = %label, global_mode, "Class label not numeric, using global mode");
                (global_mode, ItemSource::GlobalMode)
            }
        }
    }
}

fn check_dim(what: &str, expected: usize, found: usize) -> Result<(), ArtifactError> {
    if expected != found {
        return Err(ArtifactError::DimensionMismatch {
            what: what.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}
