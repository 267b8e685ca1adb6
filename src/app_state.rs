//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::service::ChatService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Chat service owning every session and wait pool.
    pub chat_service: Arc<ChatService>,
    /// Runtime configuration (connect request limits).
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Builds the state for `config`, seeding pairing from
    /// [`GatewayConfig::pairing_seed`] when set.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let chat_service = match config.pairing_seed {
            Some(seed) => ChatService::with_seed(seed),
            None => ChatService::new(),
        };
        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
        }
    }
}
