//! Creation of the process-wide PostgreSQL pool.
//!
//! Create the pool once at startup and share it (it is cheaply cloneable);
//! call [`PgPool::close`] at shutdown to drain it.
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::PoolConfig;
use crate::error::{Error, Result};

fn pool_options(config: &PoolConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(config.idle_timeout_secs.map(Duration::from_secs))
}

/// Connects to `server` and returns a pool with at least one live connection.
pub async fn create_pool(server: &str, config: &PoolConfig) -> Result<PgPool> {
    pool_options(config)
        .connect(server)
        .await
        .map_err(Error::Connection)
}

/// Returns a pool that connects on first use. Only the connection string is
/// validated here; network and auth failures surface from the first query.
///
/// Must be called from within a Tokio runtime.
pub fn create_lazy_pool(server: &str, config: &PoolConfig) -> Result<PgPool> {
    pool_options(config)
        .connect_lazy(server)
        .map_err(Error::Connection)
}
