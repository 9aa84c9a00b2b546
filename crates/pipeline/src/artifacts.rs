//! Artifact store
//!
//! Loads the trained bundle from a directory once at startup. Everything is
//! validated here; after a successful load the bundle is immutable and
//! shared read-only behind an `Arc`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use item_predictor_config::constants::artifact_files as files;
use item_predictor_config::StrategyMode;
use item_predictor_core::MemoTier;

use crate::classifier::{LogisticRegression, NaiveBayes};
use crate::ensemble::{EnsembleModel, LabelDecoder};
use crate::label::{LabelDecode, RawLabel};
use crate::memorizer::MemoTables;
use crate::quantity::{PriorTablesState, QuantityEstimator};
use crate::vectorizer::{FeatureVectorizer, TfidfVectorizer};
use crate::ArtifactError;

/// Summary of a loaded bundle, logged at startup and served by `/health`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactManifest {
    pub dir: String,
    pub ensemble_available: bool,
    pub memorizer_available: bool,
    pub word_features: usize,
    pub char_features: usize,
    pub n_classes: usize,
    pub item_uom_priors: usize,
    pub item_priors: usize,
    pub item_medians: usize,
    pub dropped_prior_keys: usize,
    /// `None` when the stored ratio is null or non-finite
    pub global_ratio: Option<f64>,
    pub global_mode: i64,
    pub memo_desc_uom_market: usize,
    pub memo_desc_uom: usize,
    pub memo_desc: usize,
    pub dropped_memo_entries: usize,
    /// An external regressor file is deployed next to the bundle
    pub extended_features: bool,
    pub regressor_files: Vec<String>,
}

/// Immutable, process-wide artifact bundle
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    ensemble: Option<Arc<EnsembleModel>>,
    memo: Option<Arc<MemoTables>>,
    quantity: Arc<QuantityEstimator>,
    global_mode: i64,
    manifest: ArtifactManifest,
}

impl ArtifactBundle {
    /// Load and validate the bundle in `dir`.
    ///
    /// Quantity priors and the global mode are always required. `Auto` loads
    /// whichever strategy artifacts are present (a partially deployed set is
    /// an error); `Ensemble` and `Memorizer` load and require only their own.
    pub fn load(dir: impl AsRef<Path>, mode: StrategyMode) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ArtifactError::MissingFile {
                path: dir.to_path_buf(),
            });
        }

        let quantity = load_priors(dir)?;
        let global_mode = load_global_mode(dir)?;

        let want_ensemble = match mode {
            StrategyMode::Ensemble => true,
            StrategyMode::Memorizer => false,
            StrategyMode::Auto => any_present(dir, &files::ENSEMBLE_REQUIRED),
        };
        let ensemble = if want_ensemble {
            Some(load_ensemble(dir)?)
        } else {
            None
        };

        let want_memo = match mode {
            StrategyMode::Memorizer => true,
            StrategyMode::Ensemble => false,
            StrategyMode::Auto => any_present(dir, &files::MEMO_TIERS),
        };
        let memo = if want_memo {
            Some(load_memo(dir)?)
        } else {
            None
        };

        let regressor_files: Vec<String> = files::REGRESSORS
            .iter()
            .filter(|name| dir.join(name).is_file())
            .map(|name| name.to_string())
            .collect();

        let mut bundle = Self::from_parts(ensemble, memo, quantity, global_mode);
        bundle.manifest.dir = dir.display().to_string();
        bundle.manifest.extended_features = !regressor_files.is_empty();
        bundle.manifest.regressor_files = regressor_files;

        let m = &bundle.manifest;
        tracing::info!(
            dir = %m.dir,
            ensemble = m.ensemble_available,
            memorizer = m.memorizer_available,
            word_features = m.word_features,
            char_features = m.char_features,
            classes = m.n_classes,
            item_uom_priors = m.item_uom_priors,
            item_priors = m.item_priors,
            item_medians = m.item_medians,
            memo_entries = m.memo_desc_uom_market + m.memo_desc_uom + m.memo_desc,
            global_mode = m.global_mode,
            extended_features = m.extended_features,
            "Loaded artifact bundle"
        );

        Ok(bundle)
    }

    /// Assemble a bundle from already validated parts
    pub fn from_parts(
        ensemble: Option<EnsembleModel>,
        memo: Option<MemoTables>,
        quantity: QuantityEstimator,
        global_mode: i64,
    ) -> Self {
        let mut manifest = ArtifactManifest {
            item_uom_priors: quantity.item_uom_entries(),
            item_priors: quantity.item_entries(),
            item_medians: quantity.median_entries(),
            dropped_prior_keys: quantity.dropped_keys(),
            global_ratio: Some(quantity.global_ratio()).filter(|r| r.is_finite()),
            global_mode,
            ..Default::default()
        };

        if let Some(model) = &ensemble {
            manifest.ensemble_available = true;
            manifest.word_features = model.vectorizer().word().vocabulary_size();
            manifest.char_features = model.vectorizer().chars().vocabulary_size();
            manifest.n_classes = model.n_classes();
        }
        if let Some(tables) = &memo {
            manifest.memorizer_available = true;
            manifest.memo_desc_uom_market = tables.tier_len(MemoTier::DescriptionUomMarket);
            manifest.memo_desc_uom = tables.tier_len(MemoTier::DescriptionUom);
            manifest.memo_desc = tables.tier_len(MemoTier::Description);
            manifest.dropped_memo_entries = tables.dropped_entries();
        }

        Self {
            ensemble: ensemble.map(Arc::new),
            memo: memo.map(Arc::new),
            quantity: Arc::new(quantity),
            global_mode,
            manifest,
        }
    }

    pub fn ensemble(&self) -> Option<&Arc<EnsembleModel>> {
        self.ensemble.as_ref()
    }

    pub fn memo(&self) -> Option<&Arc<MemoTables>> {
        self.memo.as_ref()
    }

    pub fn quantity(&self) -> &Arc<QuantityEstimator> {
        &self.quantity
    }

    pub fn global_mode(&self) -> i64 {
        self.global_mode
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }
}

fn any_present(dir: &Path, names: &[&str]) -> bool {
    names.iter().any(|name| dir.join(name).is_file())
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T, ArtifactError> {
    let path: PathBuf = dir.join(name);
    if !path.is_file() {
        return Err(ArtifactError::MissingFile { path });
    }
    let content = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse { path, source })
}

fn load_priors(dir: &Path) -> Result<QuantityEstimator, ArtifactError> {
    let state = PriorTablesState {
        ratio_item_uom: read_json(dir, files::RATIO_ITEM_UOM)?,
        ratio_item: read_json(dir, files::RATIO_ITEM)?,
        ratio_global: read_json(dir, files::RATIO_GLOBAL)?,
        item_qty_median: read_json(dir, files::ITEM_QTY_MEDIAN)?,
    };
    Ok(QuantityEstimator::from_state(state))
}

fn load_global_mode(dir: &Path) -> Result<i64, ArtifactError> {
    let raw: RawLabel = read_json(dir, files::GLOBAL_MODE)?;
    match raw.decode() {
        LabelDecode::Parsed(item) => Ok(item),
        LabelDecode::Unparseable(label) => Err(ArtifactError::Invalid(format!(
            "{}: global mode {:?} is not an item identifier",
            files::GLOBAL_MODE,
            label
        ))),
    }
}

fn load_ensemble(dir: &Path) -> Result<EnsembleModel, ArtifactError> {
    let word = TfidfVectorizer::from_state(read_json(dir, files::TFIDF_WORD)?, files::TFIDF_WORD)?;
    let chars = TfidfVectorizer::from_state(read_json(dir, files::TFIDF_CHAR)?, files::TFIDF_CHAR)?;
    let lr = LogisticRegression::from_state(read_json(dir, files::LR_MODEL)?)?;
    let nb = NaiveBayes::from_state(read_json(dir, files::NB_MODEL)?)?;
    let decoder = LabelDecoder::from_state(read_json(dir, files::LABEL_ENCODER)?)?;

    EnsembleModel::new(FeatureVectorizer::new(word, chars), lr, nb, decoder)
}

fn load_memo(dir: &Path) -> Result<MemoTables, ArtifactError> {
    Ok(MemoTables::from_entries(
        read_json(dir, files::MEMO_DESC_UOM_MARKET)?,
        read_json(dir, files::MEMO_DESC_UOM)?,
        read_json(dir, files::MEMO_DESC)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn write_priors(dir: &Path) {
        write(dir, files::RATIO_ITEM_UOM, r#"{"5": {"EA": 2.0}}"#);
        write(dir, files::RATIO_ITEM, r#"{"5": 3.0, "x": 1.0}"#);
        write(dir, files::RATIO_GLOBAL, "null");
        write(dir, files::ITEM_QTY_MEDIAN, r#"{"5": 4.0}"#);
        write(dir, files::GLOBAL_MODE, "5");
    }

    #[test]
    fn test_missing_directory() {
        let err = ArtifactBundle::load("/nonexistent/item-predictor", StrategyMode::Auto).unwrap_err();
        assert!(matches!(err, ArtifactError::MissingFile { .. }));
    }

    #[test]
    fn test_priors_only_bundle_has_no_strategy_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write_priors(dir.path());

        let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
        let manifest = bundle.manifest();
        assert!(!manifest.ensemble_available);
        assert!(!manifest.memorizer_available);
        assert_eq!(manifest.dropped_prior_keys, 1);
        assert_eq!(manifest.global_ratio, None);
        assert_eq!(bundle.global_mode(), 5);
        assert!(bundle.quantity().global_ratio().is_nan());
    }

    #[test]
    fn test_missing_prior_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_priors(dir.path());
        fs::remove_file(dir.path().join(files::ITEM_QTY_MEDIAN)).unwrap();

        match ArtifactBundle::load(dir.path(), StrategyMode::Auto) {
            Err(ArtifactError::MissingFile { path }) => {
                assert!(path.ends_with(files::ITEM_QTY_MEDIAN))
            }
            other => panic!("expected missing file, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_priors(dir.path());
        write(dir.path(), files::RATIO_ITEM, "{not json");

        assert!(matches!(
            ArtifactBundle::load(dir.path(), StrategyMode::Auto),
            Err(ArtifactError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_numeric_global_mode_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_priors(dir.path());
        write(dir.path(), files::GLOBAL_MODE, r#""unknown""#);

        assert!(matches!(
            ArtifactBundle::load(dir.path(), StrategyMode::Auto),
            Err(ArtifactError::Invalid(_))
        ));
    }

    #[test]
    fn test_forced_ensemble_requires_its_files() {
        let dir = tempfile::tempdir().unwrap();
        write_priors(dir.path());

        assert!(matches!(
            ArtifactBundle::load(dir.path(), StrategyMode::Ensemble),
            Err(ArtifactError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_partial_memo_set_is_fatal_in_auto() {
        let dir = tempfile::tempdir().unwrap();
        write_priors(dir.path());
        write(dir.path(), files::MEMO_DESC, "[]");

        assert!(matches!(
            ArtifactBundle::load(dir.path(), StrategyMode::Auto),
            Err(ArtifactError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_regressor_presence_sets_extended_flag() {
        let dir = tempfile::tempdir().unwrap();
        write_priors(dir.path());
        write(dir.path(), "regressor_xgb.json", "{}");

        let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
        assert!(bundle.manifest().extended_features);
        assert_eq!(bundle.manifest().regressor_files, vec!["regressor_xgb.json"]);
    }
}
