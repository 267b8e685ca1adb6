//! Router assembly and server bootstrap.

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::api;
use crate::app_state::AppState;
use crate::config::{GatewayConfig, LogFormat};
use crate::ws::handler::ws_handler;

/// Builds the full application router: `/ws`, system routes and docs.
pub fn build_app(state: AppState) -> Router {
    let timeout = state.config.request_timeout;
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(timeout_layer(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Answers requests that outlive `timeout` with `408 Request Timeout`.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Installs the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

/// Binds `config.listen_addr` and serves until the process is stopped.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(config: GatewayConfig) -> std::io::Result<()> {
    let listen_addr = config.listen_addr;
    let app = build_app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await
}
