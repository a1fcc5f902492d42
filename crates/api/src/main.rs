//! Weather Station API - Main Entry Point

use tracing::info;
use weather_api::config::{AppConfig, DEFAULT_CONFIG_PATH};
use weather_api::run_server;
use weather_api::telemetry::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&path)?;

    init_logging(&config.logging)?;

    info!("=== Weather Station API v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", path);

    run_server(config).await
}
