use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use htmlive_common::memory::{MemoryIdentityService, MemoryStore};
use tracing::{Level, info};

use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        identity: Arc::new(MemoryIdentityService::new(config.auth.lockout())),
        config,
    };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/swagger-ui and http://{}/scalar", addr, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
