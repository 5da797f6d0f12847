use crate::{error::AppError, AppState};
use axum::{extract::State, Json};
use core_types::Snapshot;
use std::sync::Arc;

/// # GET /api/analysis/latest
/// Returns the most recent completed snapshot without triggering a rebuild.
pub async fn get_latest_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Arc<Snapshot>>, AppError> {
    state
        .engine
        .latest_snapshot()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no analysis snapshot has been built yet".to_string()))
}

/// # POST /api/analysis/rebuild
/// Runs one full analysis pass and returns the fresh snapshot. Answers 202
/// while another rebuild is in flight.
pub async fn rebuild_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Arc<Snapshot>>, AppError> {
    let snapshot = state.engine.rebuild_snapshot().await?;
    Ok(Json(snapshot))
}
