//! Centralized constants for the item predictor
//!
//! Values here are part of the training/serving contract: changing any of
//! them silently changes predictions without raising an error.

/// Artifact file names inside the artifact directory
pub mod artifact_files {
    pub const TFIDF_WORD: &str = "tfidf_word.json";
    pub const TFIDF_CHAR: &str = "tfidf_char.json";
    pub const LR_MODEL: &str = "lr_model.json";
    pub const NB_MODEL: &str = "nb_model.json";
    pub const LABEL_ENCODER: &str = "label_encoder.json";

    pub const RATIO_ITEM_UOM: &str = "ratio_item_uom.json";
    pub const RATIO_ITEM: &str = "ratio_item.json";
    pub const RATIO_GLOBAL: &str = "ratio_global.json";
    pub const ITEM_QTY_MEDIAN: &str = "item_qty_median.json";
    pub const GLOBAL_MODE: &str = "global_mode_int.json";

    pub const MEMO_DESC_UOM_MARKET: &str = "memo_desc_uom_market.json";
    pub const MEMO_DESC_UOM: &str = "memo_desc_uom.json";
    pub const MEMO_DESC: &str = "memo_desc.json";

    /// External regressor files; any one present enables the extended path
    pub const REGRESSORS: [&str; 3] = [
        "regressor_lgbm.txt",
        "regressor_xgb.json",
        "regressor_cat.cbm",
    ];

    /// Files the ensemble strategy cannot run without
    pub const ENSEMBLE_REQUIRED: [&str; 5] =
        [TFIDF_WORD, TFIDF_CHAR, LR_MODEL, NB_MODEL, LABEL_ENCODER];

    /// Memorization tiers, most specific first
    pub const MEMO_TIERS: [&str; 3] = [MEMO_DESC_UOM_MARKET, MEMO_DESC_UOM, MEMO_DESC];
}

/// Classification ensemble weights
pub mod ensemble {
    /// Weight of the logistic-regression probabilities
    pub const LR_WEIGHT: f64 = 0.7;
    /// Weight of the naive-Bayes probabilities
    pub const NB_WEIGHT: f64 = 0.3;
}

/// Meta-feature composition tokens
pub mod meta {
    pub const UOM_PREFIX: &str = " __uom=";
    pub const CORE_MARKET_PREFIX: &str = " __core_market=";
    /// Tier marker appended to every composite string (training used "none")
    pub const MEMO_TIER_MARKER: &str = " __memo_tier=none";
}

/// Quantity estimation constants
pub mod quantity {
    /// Multiplier applied to the resolved ratio.
    ///
    /// Stands in for an extended-quantity factor that no request carries yet.
    pub const EXTENDED_QUANTITY_FACTOR: f64 = 1.0;

    /// Last-resort quantity when every tier and the median are unusable
    pub const QUANTITY_FLOOR: f64 = 1.0;
}

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// OpenAI-compatible chat completions base URL
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Deployed frontend origin
    pub const FRONTEND_DEPLOYED_ORIGIN: &str = "https://ctai-ctd-hackathon-frontend.vercel.app";

    /// Local frontend origin; also the fallback when no configured origin parses
    pub const FRONTEND_DEV_ORIGIN: &str = "http://localhost:3000";
}
