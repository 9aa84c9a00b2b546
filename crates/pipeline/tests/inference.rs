//! End-to-end inference over a small artifact directory

use std::fs;
use std::path::Path;

use item_predictor_config::constants::artifact_files as files;
use item_predictor_config::StrategyMode;
use item_predictor_core::{ItemSource, MemoTier, QuantitySource};
use item_predictor_pipeline::{build_predictor, ArtifactBundle, ArtifactError};
use tempfile::TempDir;

const GLOBAL_MODE: i64 = 999;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Three classes over three features:
/// - class 0 ("abc") is not an item, so it decodes to the global mode
/// - class 1 ("100.0") fires on "pipe"
/// - class 2 ("200") fires on "valve"
///
/// The char vectorizer's only term never occurs in test inputs.
fn write_ensemble(dir: &Path) {
    write(
        dir,
        files::TFIDF_WORD,
        r#"{"analyzer": "word", "ngram_range": [1, 1], "vocabulary": {"pipe": 0, "valve": 1}, "idf": [1.0, 1.0]}"#,
    );
    write(
        dir,
        files::TFIDF_CHAR,
        r#"{"analyzer": "char_wb", "ngram_range": [3, 3], "vocabulary": {"xyz": 0}, "idf": [1.0]}"#,
    );
    write(
        dir,
        files::LR_MODEL,
        r#"{"coef": [[0, 0, 0], [5, 0, 0], [0, 5, 0]], "intercept": [0, 0, 0], "multi_class": "multinomial"}"#,
    );
    write(
        dir,
        files::NB_MODEL,
        r#"{
            "kind": "multinomial",
            "feature_log_prob": [[-5, -5, 0], [0, -5, 0], [-5, 0, 0]],
            "class_log_prior": [-1.0986122886681098, -1.0986122886681098, -1.0986122886681098]
        }"#,
    );
    write(dir, files::LABEL_ENCODER, r#"{"classes": ["abc", "100.0", "200"]}"#);
}

fn write_priors(dir: &Path) {
    write(dir, files::RATIO_ITEM_UOM, r#"{"100": {"EA": 2.5, "CS": null}}"#);
    write(dir, files::RATIO_ITEM, r#"{"100": 4.0, "200": -1.0}"#);
    write(dir, files::RATIO_GLOBAL, "1.5");
    write(dir, files::ITEM_QTY_MEDIAN, r#"{"200": 7.0}"#);
    write(dir, files::GLOBAL_MODE, &GLOBAL_MODE.to_string());
}

fn write_memo(dir: &Path) {
    write(
        dir,
        files::MEMO_DESC_UOM_MARKET,
        r#"[{"description": "pipe fitting", "uom": "EA", "core_market": "East", "item": 100}]"#,
    );
    write(
        dir,
        files::MEMO_DESC_UOM,
        r#"[{"description": "pipe fitting", "uom": "EA", "item": 200}]"#,
    );
    write(dir, files::MEMO_DESC, r#"[{"description": "pipe fitting", "item": "300"}]"#);
}

fn ensemble_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_ensemble(dir.path());
    write_priors(dir.path());
    dir
}

#[test]
fn test_ensemble_prediction_with_uom_prior() {
    let dir = ensemble_dir();
    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
    let predictor = build_predictor(&bundle, StrategyMode::Auto).unwrap();
    assert_eq!(predictor.name(), "ensemble");

    let prediction = predictor.predict("Copper PIPE", Some("EA"), Some("East"));
    assert_eq!(prediction.into_tuple(), (100, 2.5));
    assert_eq!(prediction.item_source, ItemSource::Classifier);
    assert_eq!(prediction.quantity_source, QuantitySource::ItemUomPrior);
}

#[test]
fn test_item_prior_when_uom_misses_or_is_stale() {
    let dir = ensemble_dir();
    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
    let predictor = build_predictor(&bundle, StrategyMode::Auto).unwrap();

    for uom in [Some("BX"), Some("CS"), Some(""), None] {
        let prediction = predictor.predict("pipe", uom, None);
        assert_eq!(prediction.into_tuple(), (100, 4.0), "uom {:?}", uom);
        assert_eq!(prediction.quantity_source, QuantitySource::ItemPrior);
    }
}

#[test]
fn test_negative_ratio_uses_median() {
    let dir = ensemble_dir();
    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
    let predictor = build_predictor(&bundle, StrategyMode::Auto).unwrap();

    let prediction = predictor.predict("valve", None, None);
    assert_eq!(prediction.into_tuple(), (200, 7.0));
    assert_eq!(prediction.quantity_source, QuantitySource::ItemMedian);
}

#[test]
fn test_empty_input_falls_back_to_global_mode() {
    let dir = ensemble_dir();
    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
    let predictor = build_predictor(&bundle, StrategyMode::Auto).unwrap();

    // All-zero features give tied probabilities; class 0 wins and is not numeric
    let prediction = predictor.predict("", None, None);
    assert_eq!(prediction.into_tuple(), (GLOBAL_MODE, 1.5));
    assert_eq!(prediction.item_source, ItemSource::GlobalMode);
    assert_eq!(prediction.quantity_source, QuantitySource::GlobalPrior);
}

#[test]
fn test_predictions_are_deterministic_and_positive() {
    let dir = ensemble_dir();
    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
    let predictor = build_predictor(&bundle, StrategyMode::Auto).unwrap();

    let inputs = [
        ("pipe", Some("EA"), Some("East")),
        ("valve", Some("CS"), None),
        ("", None, None),
        ("gasket ring", Some("box"), Some("west coast")),
        ("  \n ", Some(""), Some("")),
    ];
    for (description, uom, market) in inputs {
        let first = predictor.predict(description, uom, market);
        let second = predictor.predict(description, uom, market);
        assert_eq!(first, second);
        assert!(first.quantity.is_finite() && first.quantity > 0.0);
    }
}

#[test]
fn test_quantity_floor_when_every_prior_is_unusable() {
    let dir = ensemble_dir();
    write(dir.path(), files::RATIO_ITEM, "{}");
    write(dir.path(), files::RATIO_GLOBAL, "null");
    write(dir.path(), files::ITEM_QTY_MEDIAN, "{}");

    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
    let predictor = build_predictor(&bundle, StrategyMode::Auto).unwrap();

    let prediction = predictor.predict("valve", None, None);
    assert_eq!(prediction.into_tuple(), (200, 1.0));
    assert_eq!(prediction.quantity_source, QuantitySource::Floor);
}

#[test]
fn test_feature_dimension_mismatch_is_fatal() {
    let dir = ensemble_dir();
    write(
        dir.path(),
        files::LR_MODEL,
        r#"{"coef": [[0, 0], [5, 0], [0, 5]], "intercept": [0, 0, 0]}"#,
    );

    match ArtifactBundle::load(dir.path(), StrategyMode::Auto) {
        Err(ArtifactError::DimensionMismatch { expected, found, .. }) => {
            assert_eq!((expected, found), (3, 2));
        }
        other => panic!("expected dimension mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_class_count_mismatch_is_fatal() {
    let dir = ensemble_dir();
    write(dir.path(), files::LABEL_ENCODER, r#"{"classes": ["1", "2"]}"#);

    assert!(matches!(
        ArtifactBundle::load(dir.path(), StrategyMode::Auto),
        Err(ArtifactError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_memorizer_tiers_most_specific_first() {
    let dir = tempfile::tempdir().unwrap();
    write_priors(dir.path());
    write_memo(dir.path());

    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Auto).unwrap();
    let predictor = build_predictor(&bundle, StrategyMode::Auto).unwrap();
    assert_eq!(predictor.name(), "memorizer");

    let exact = predictor.predict("Pipe Fitting", Some("EA"), Some("East"));
    assert_eq!(exact.item, 100);
    assert_eq!(exact.item_source, ItemSource::Memo(MemoTier::DescriptionUomMarket));

    let by_uom = predictor.predict("pipe fitting", Some("EA"), Some("North"));
    assert_eq!(by_uom.item, 200);
    assert_eq!(by_uom.item_source, ItemSource::Memo(MemoTier::DescriptionUom));

    let by_desc = predictor.predict("pipe fitting", None, None);
    assert_eq!(by_desc.item, 300);
    assert_eq!(by_desc.item_source, ItemSource::Memo(MemoTier::Description));

    let miss = predictor.predict("", None, None);
    assert_eq!(miss.into_tuple(), (GLOBAL_MODE, 1.5));
    assert_eq!(miss.item_source, ItemSource::GlobalMode);
}

#[test]
fn test_forced_memorizer_skips_ensemble_files() {
    let dir = ensemble_dir();
    write_memo(dir.path());
    // A broken ensemble file is never read when the memorizer is forced
    write(dir.path(), files::LR_MODEL, "{broken");

    let bundle = ArtifactBundle::load(dir.path(), StrategyMode::Memorizer).unwrap();
    assert!(!bundle.manifest().ensemble_available);
    let predictor = build_predictor(&bundle, StrategyMode::Memorizer).unwrap();
    assert_eq!(predictor.name(), "memorizer");
}
