//! Item Predictor Server
//!
//! HTTP endpoints for predictions, chat explanations, health and metrics.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_chat, record_prediction};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use item_predictor_pipeline::ArtifactError;

/// Server errors
///
/// Artifact failures only occur while building [`AppState`]; request handlers
/// produce `InvalidRequest`.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let invalid = ServerError::InvalidRequest("message must not be empty".to_string());
        assert_eq!(StatusCode::from(&invalid), StatusCode::BAD_REQUEST);

        let artifact = ServerError::from(ArtifactError::NoStrategy("no artifacts".to_string()));
        assert_eq!(StatusCode::from(&artifact), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(artifact.to_string(), "Artifact error: No inference strategy available: no artifacts");
    }
}
