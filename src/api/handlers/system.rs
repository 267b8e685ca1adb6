//! System endpoints: health check.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the server answers.
    pub status: String,
    /// RFC 3339 server time.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Live sessions.
    pub connected_clients: usize,
    /// Live sessions with a partner.
    pub paired_clients: usize,
    /// Clients waiting for any partner.
    pub waiting_unconditional: usize,
    /// Clients waiting per interest tag.
    pub waiting_by_interest: BTreeMap<String, usize>,
}

/// `GET /healthcheck` — Service health and matchmaking counts.
#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, and a snapshot of connected, paired and waiting clients.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.chat_service.snapshot().await;
    tracing::debug!(connected = stats.connected, "health check");
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            connected_clients: stats.connected,
            paired_clients: stats.paired,
            waiting_unconditional: stats.waiting_unconditional,
            waiting_by_interest: stats.waiting_by_interest,
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/healthcheck", get(health_handler))
}
