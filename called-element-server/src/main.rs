//! called-element-server: HTTP front end for called-element resolution.
//!
//! Configuration comes from the environment (a `.env` file is honoured);
//! see [`called_element_server::config`].

use std::sync::Arc;

use anyhow::{Context, Result};
use called_element_server::config::ServerConfig;
use called_element_server::router::build_router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,called_element_server=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        profiles = config.profiles.len(),
        default_profile = %config.default_profile,
        "configuration loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let app = build_router(Arc::new(config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!("called-element-server listening on {bind_addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
