//! REST API endpoints.
//!
//! Axum-based HTTP API for the ladder: read the ranking, add a player on
//! demand, and inspect the background refresh.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::riot::RiotError;
use crate::sync::ReconcileError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Upstream error: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Upstream { status, .. } => (*status, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        let message = err.to_string();
        match err {
            ReconcileError::AccountNotFound(_) => ApiError::NotFound(message),
            ReconcileError::Storage(_) => ApiError::Internal(message),
            ReconcileError::Riot(riot) => {
                let status = match riot {
                    RiotError::Unauthorized { .. } | RiotError::InvalidApiKey => {
                        return ApiError::Forbidden(message)
                    }
                    RiotError::Status { status, .. } => {
                        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    RiotError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                    RiotError::Timeout { .. } | RiotError::Http(_) | RiotError::InvalidUrl(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                ApiError::Upstream { status, message }
            }
        }
    }
}

/// CORS for the browser frontend. `*` allows any origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin.trim() == "*" {
        return CorsLayer::permissive();
    }

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            CorsLayer::permissive()
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/health", get(routes::status::health))
        .route("/api/ranking", get(routes::ranking::get_ranking))
        .route("/api/players", post(routes::players::add_player))
        .route("/api/refresh/status", get(routes::status::refresh_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
