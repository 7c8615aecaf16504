//! # Postgres Persistence
//!
//! Provides Postgres persistence for application records via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, every
//! submission and status update is written through to PostgreSQL and the
//! in-memory store is hydrated from it on startup. When absent, the API
//! operates in in-memory-only mode (suitable for development and testing).
//!
//! The in-memory store stays the read path either way; the database is a
//! durability layer, not a query engine.

pub mod applications;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect the pool and bring the schema up to date.
///
/// `None` when `DATABASE_URL` is unset; the portal then runs purely in
/// memory. `Err` only when the URL is present but connecting or migrating
/// fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    // Apply the embedded migration set.
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
