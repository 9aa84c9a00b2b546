//! HTTP Endpoints
//!
//! REST API for the item predictor.

use std::time::{Duration, Instant};

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use item_predictor_config::constants::endpoints::FRONTEND_DEV_ORIGIN;
use item_predictor_core::{Explanation, PredictionRecord};

use crate::metrics::{metrics_handler, record_chat, record_prediction};
use crate::state::AppState;
use crate::ServerError;

/// Preflight cache lifetime
const CORS_MAX_AGE: Duration = Duration::from_secs(600);

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        .route("/", get(root))
        .route("/predict", post(predict))
        .route("/chat", post(chat))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If no configured origin is valid, falls back to the local frontend
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let mut parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", FRONTEND_DEV_ORIGIN);
        parsed_origins.push(HeaderValue::from_static(FRONTEND_DEV_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false)
        .max_age(CORS_MAX_AGE)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Item predictor backend is running!" }))
}

/// Predict request
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub description: String,
    #[serde(default)]
    pub uom: Option<String>,
    #[serde(default)]
    pub core_market: Option<String>,
}

/// Predict response; hints are echoed as received
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(rename = "MasterItemNo")]
    pub master_item_no: i64,
    #[serde(rename = "QtyShipped")]
    pub qty_shipped: f64,
    pub uom: Option<String>,
    pub core_market: Option<String>,
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Json<PredictResponse> {
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    let prediction = state.predictor.predict(
        &request.description,
        request.uom.as_deref(),
        request.core_market.as_deref(),
    );
    let latency = start.elapsed();

    let strategy = state.predictor.name();
    record_prediction(strategy, &prediction, latency);
    tracing::info!(
        %request_id,
        strategy,
        item = prediction.item,
        quantity = prediction.quantity,
        item_source = prediction.item_source.as_str(),
        quantity_source = prediction.quantity_source.as_str(),
        latency_us = latency.as_micros() as u64,
        "Prediction served"
    );

    let PredictRequest {
        description,
        uom,
        core_market,
    } = request;
    state.remember_prediction(PredictionRecord::new(
        description,
        uom.clone(),
        core_market.clone(),
        prediction,
        strategy,
    ));

    Json(PredictResponse {
        master_item_no: prediction.item,
        qty_shipped: prediction.quantity,
        uom,
        core_market,
    })
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Explanation>, ServerError> {
    if request.message.trim().is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".to_string()));
    }

    let context = state.last_prediction();
    let explanation = state.explainer.explain(&request.message, context.as_ref()).await;

    record_chat(explanation.source);
    tracing::info!(
        explainer = state.explainer.name(),
        source = explanation.source.as_str(),
        has_context = context.is_some(),
        "Chat reply served"
    );

    Ok(Json(explanation))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": state.predictor.name(),
        "explainer": state.explainer.name(),
        "artifacts": state.manifest.as_ref(),
    }))
}
