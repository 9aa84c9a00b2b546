//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;

use item_predictor_config::Settings;
use item_predictor_core::{Explainer, ItemPredictor, PredictionRecord};
use item_predictor_llm::ExplanationService;
use item_predictor_pipeline::{build_predictor, ArtifactBundle, ArtifactManifest};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Strategy selected at startup
    pub predictor: Arc<dyn ItemPredictor>,
    pub explainer: Arc<dyn Explainer>,
    pub manifest: Arc<ArtifactManifest>,
    /// Most recent prediction, read by the chat endpoint only
    last_prediction: Arc<RwLock<Option<PredictionRecord>>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        predictor: Arc<dyn ItemPredictor>,
        explainer: Arc<dyn Explainer>,
        manifest: ArtifactManifest,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            predictor,
            explainer,
            manifest: Arc::new(manifest),
            last_prediction: Arc::new(RwLock::new(None)),
            metrics: None,
        }
    }

    /// Load the artifact bundle and build every collaborator from settings.
    ///
    /// Artifact errors are fatal; an explainer that cannot be built degrades
    /// to rule-based replies.
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let mode = settings.artifacts.strategy;
        let bundle = ArtifactBundle::load(&settings.artifacts.dir, mode)?;
        let predictor = build_predictor(&bundle, mode)?;

        let explainer = match ExplanationService::from_config(&settings.explain) {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!(error = %e, "Explainer unavailable, using rule-based replies");
                ExplanationService::fallback_only(e.to_string())
            }
        };

        tracing::info!(
            strategy = predictor.name(),
            explainer = explainer.name(),
            "Initialized application state"
        );

        Ok(Self::new(
            settings,
            predictor,
            Arc::new(explainer),
            bundle.manifest().clone(),
        ))
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    pub fn remember_prediction(&self, record: PredictionRecord) {
        *self.last_prediction.write() = Some(record);
    }

    pub fn last_prediction(&self) -> Option<PredictionRecord> {
        self.last_prediction.read().clone()
    }
}
