//! Database layer - connection pool, statement execution and search statements

pub mod executor;
mod rows;
pub mod search;

pub use executor::{MySqlExecutor, StatementExecutor};

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::Result;

/// Open a connection pool for the configured store.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<MySqlPool> {
    tracing::info!(
        pool_min_size = config.pool_min_size,
        pool_max_size = config.pool_max_size,
        "Connecting to database"
    );

    let pool = MySqlPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.url)
        .await?;

    Ok(pool)
}
