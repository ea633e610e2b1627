use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::sync::SchedulerStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub players: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let players = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(HealthResponse {
        status: "ok",
        players: players.len(),
    }))
}

/// GET /api/refresh/status
pub async fn refresh_status(State(state): State<AppState>) -> Json<SchedulerStatus> {
    let status = state.scheduler_status.read().await.clone();
    Json(status)
}
