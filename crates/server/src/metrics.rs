//! Prometheus metrics

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use item_predictor_core::{ExplanationSource, Prediction};

use crate::state::AppState;

/// Install the global Prometheus recorder. Call once per process.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_prediction(strategy: &'static str, prediction: &Prediction, latency: Duration) {
    counter!("item_predictor_predictions_total", "strategy" => strategy).increment(1);
    histogram!("item_predictor_prediction_latency_seconds").record(latency.as_secs_f64());

    if prediction.item_source.is_fallback() {
        counter!(
            "item_predictor_item_fallbacks_total",
            "source" => prediction.item_source.as_str()
        )
        .increment(1);
    }
    counter!(
        "item_predictor_quantity_source_total",
        "source" => prediction.quantity_source.as_str()
    )
    .increment(1);
}

pub fn record_chat(source: ExplanationSource) {
    counter!("item_predictor_chat_total", "source" => source.as_str()).increment(1);
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics are disabled\n".to_string()),
    }
}
