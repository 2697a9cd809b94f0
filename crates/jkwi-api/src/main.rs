//! # jkwi-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment:
//! `PORT`, `AUTH_TOKEN`, `JKWI_DATA_DIR`, `JKWI_STORE`.

use anyhow::Context;
use jkwi_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid server configuration")?;
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; authentication is disabled");
    }
    tracing::info!(config = ?config, "starting JKWI API");

    let port = config.port;
    let state = AppState::with_config(config);
    let app = jkwi_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("JKWI API listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
