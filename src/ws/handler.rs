//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;

use super::connection::run_connection;
use super::messages::ConnectQuery;
use crate::app_state::AppState;
use crate::error::GatewayError;

/// `GET /ws` — Upgrade HTTP connection to WebSocket and enter matchmaking.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] before upgrading if the query
/// exceeds the configured identifier or interest limits.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let query: ConnectQuery = pairs.into_iter().collect();
    let request = query.into_request(&state.config)?;
    let service = Arc::clone(&state.chat_service);

    Ok(ws.on_upgrade(move |socket| run_connection(socket, service, request)))
}
