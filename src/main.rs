//! banter-gateway server entry point.
//!
//! Loads configuration, installs tracing and serves the WebSocket and
//! health endpoints.

use banter_gateway::config::GatewayConfig;
use banter_gateway::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    server::init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting banter-gateway");

    // Start server
    server::serve(config).await?;

    Ok(())
}
