use aggregator::AggregatorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Aggregator error: {0}")]
    Aggregator(#[from] AggregatorError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // A rebuild overlap is a busy signal, not a failure: answer 202
            // and let the caller keep polling the latest snapshot.
            AppError::Aggregator(AggregatorError::RebuildInProgress) => (
                StatusCode::ACCEPTED,
                Json(json!({ "status": "a rebuild is already in progress" })),
            )
                .into_response(),
            AppError::Aggregator(err) => {
                tracing::error!(error = ?err, "Rebuild failed.");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "failed to rebuild the analysis snapshot" })),
                )
                    .into_response()
            }
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}
