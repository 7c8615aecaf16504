//! dpp-api server binary.
//!
//! Loads configuration from the environment, connects to Postgres when
//! `DATABASE_URL` is set, hydrates the in-memory store, and serves the
//! API.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dpp_api::state::{AppConfig, AppState};
use dpp_core::SystemClock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let port = config.port;

    if config.auth_token.is_none() {
        tracing::warn!(
            "DPP_AUTH_TOKEN not set — authentication disabled, every caller runs as admin"
        );
    }

    let db_pool = dpp_api::db::init_pool().await?;
    let state = AppState::with_parts(config, Arc::new(SystemClock), db_pool)?;
    state.hydrate_from_db().await?;

    let app = dpp_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("dpp-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // ConnectInfo feeds the rate limiter's socket-address fallback when no
    // X-Forwarded-For header is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
