//! Linear classifiers over sparse TF-IDF features
//!
//! Both models are evaluated from their exported parameters; probabilities
//! follow the scikit-learn `predict_proba` formulas so the ensemble sees the
//! same numbers it saw during validation.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::sparse::SparseVector;
use crate::ArtifactError;

/// Logistic-regression probability model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over class scores
    #[default]
    Multinomial,
    /// One-vs-rest sigmoids, renormalized
    Ovr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegressionState {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

/// Logistic regression
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Array2<f64>,
    intercept: Array1<f64>,
    multi_class: MultiClass,
}

impl LogisticRegression {
    pub fn from_state(state: LogisticRegressionState) -> Result<Self, ArtifactError> {
        let coef = matrix_from_rows(state.coef, "lr coef")?;
        if state.intercept.len() != coef.nrows() {
            return Err(ArtifactError::DimensionMismatch {
                what: "lr intercept".to_string(),
                expected: coef.nrows(),
                found: state.intercept.len(),
            });
        }
        Ok(Self {
            coef,
            intercept: Array1::from(state.intercept),
            multi_class: state.multi_class,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    /// A single coefficient row is a binary model over two classes
    pub fn n_classes(&self) -> usize {
        match self.coef.nrows() {
            1 => 2,
            rows => rows,
        }
    }

    pub fn decision_function(&self, x: &SparseVector) -> Array1<f64> {
        x.dot_rows(&self.coef) + &self.intercept
    }

    pub fn predict_proba(&self, x: &SparseVector) -> Array1<f64> {
        let scores = self.decision_function(x);

        if scores.len() == 1 {
            let score = scores[0];
            return match self.multi_class {
                MultiClass::Ovr => {
                    let p = sigmoid(score);
                    Array1::from(vec![1.0 - p, p])
                }
                MultiClass::Multinomial => softmax(Array1::from(vec![-score, score])),
            };
        }

        match self.multi_class {
            MultiClass::Multinomial => softmax(scores),
            MultiClass::Ovr => {
                let probs = scores.mapv(sigmoid);
                let total = probs.sum();
                probs / total
            }
        }
    }
}

/// Naive-Bayes variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NaiveBayesKind {
    #[default]
    Multinomial,
    Complement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NaiveBayesState {
    #[serde(default)]
    pub kind: NaiveBayesKind,
    pub feature_log_prob: Vec<Vec<f64>>,
    pub class_log_prior: Vec<f64>,
}

/// Multinomial or complement naive Bayes
#[derive(Debug, Clone)]
pub struct NaiveBayes {
    kind: NaiveBayesKind,
    feature_log_prob: Array2<f64>,
    class_log_prior: Array1<f64>,
}

impl NaiveBayes {
    pub fn from_state(state: NaiveBayesState) -> Result<Self, ArtifactError> {
        let feature_log_prob = matrix_from_rows(state.feature_log_prob, "nb feature_log_prob")?;
        if state.class_log_prior.len() != feature_log_prob.nrows() {
            return Err(ArtifactError::DimensionMismatch {
                what: "nb class_log_prior".to_string(),
                expected: feature_log_prob.nrows(),
                found: state.class_log_prior.len(),
            });
        }
        Ok(Self {
            kind: state.kind,
            feature_log_prob,
            class_log_prior: Array1::from(state.class_log_prior),
        })
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.feature_log_prob.nrows()
    }

    pub fn joint_log_likelihood(&self, x: &SparseVector) -> Array1<f64> {
        let jll = x.dot_rows(&self.feature_log_prob);
        match self.kind {
            NaiveBayesKind::Multinomial => jll + &self.class_log_prior,
            NaiveBayesKind::Complement if self.n_classes() == 1 => jll + &self.class_log_prior,
            NaiveBayesKind::Complement => jll,
        }
    }

    pub fn predict_proba(&self, x: &SparseVector) -> Array1<f64> {
        let jll = self.joint_log_likelihood(x);
        let log_prob_x = logsumexp(&jll);
        jll.mapv(|v| (v - log_prob_x).exp())
    }
}

fn matrix_from_rows(rows: Vec<Vec<f64>>, what: &str) -> Result<Array2<f64>, ArtifactError> {
    let nrows = rows.len();
    if nrows == 0 {
        return Err(ArtifactError::Invalid(format!("{} has no rows", what)));
    }
    let ncols = rows[0].len();
    if let Some(bad) = rows.iter().find(|row| row.len() != ncols) {
        return Err(ArtifactError::DimensionMismatch {
            what: format!("{} row length", what),
            expected: ncols,
            found: bad.len(),
        });
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| ArtifactError::Invalid(format!("{}: {}", what, e)))
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: Array1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exp = scores.mapv(|v| (v - max).exp());
    let total = exp.sum();
    exp / total
}

fn logsumexp(values: &Array1<f64>) -> f64 {
    let max = values.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    if !max.is_finite() {
        return max;
    }
    values.mapv(|v| (v - max).exp()).sum().ln() + max
}
