//! Seen Group gateway
//!
//! Run with: cargo run -p seengroup-web

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seengroup_config::Config;
use seengroup_web::{router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Seen Group gateway...");

    let config = Config::load().context("loading configuration")?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid listen address")?;

    let state = AppState::new(config).context("building application state")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    tokio::select! {
        r = axum::serve(listener, app) => {
            if let Err(e) = r {
                warn!("server ended unexpectedly: {:?}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl+c, shutting down");
        }
    }
    Ok(())
}
