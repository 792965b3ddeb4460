//! HTTP server startup.

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;

use framepulse_core::Config;

pub async fn start_server(config: &Config, router: Router) -> Result<(), anyhow::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        port = config.server_port,
        environment = %config.environment,
        "Framepulse API listening"
    );

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
