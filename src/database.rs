/// SQLite pool setup for snapshot storage
///
/// Creates the data directory and database file on first start, and offers a
/// single-connection in-memory pool for tests and throwaway runs.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Open (creating if missing) the file-backed snapshot database
pub async fn open_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    std::fs::create_dir_all(&config.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", config.data_dir, e))?;

    let db_path = config.db_path();
    tracing::info!("🗄️ Opening snapshot database: {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// In-memory database; one connection so every query sees the same data
pub async fn open_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    Ok(pool)
}
