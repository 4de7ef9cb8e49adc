//! Connection handling and schema bootstrap.

use crate::error::StoreResult;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use usdm_core::CoreError;

/// Shared handle to the sqlite database.
///
/// Cheap to clone; all methods take `&self` and go through the pool.
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path` and apply the
    /// schema.
    pub async fn connect(path: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{path}"))?
            .create_if_missing(true)
            .journal_mode(sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30));
        let pool = SqlitePool::connect_with(options).await?;
        info!(path, "Opened sqlite store");
        Self::bootstrap(pool).await
    }

    /// In-memory database, used by tests.
    ///
    /// Pinned to a single connection: every pooled `:memory:` connection
    /// would otherwise open its own empty database.
    pub async fn connect_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::bootstrap(pool).await
    }

    async fn bootstrap(pool: SqlitePool) -> StoreResult<Self> {
        let schema = include_str!("../sql/schema.sql");
        sqlx::raw_sql(schema).execute(&pool).await?;
        Ok(Self { pool })
    }
}

/// Decode an epoch-milliseconds column.
pub(crate) fn datetime_from_ms(ms: i64) -> Result<DateTime<Utc>, CoreError> {
    DateTime::from_timestamp_millis(ms).ok_or(CoreError::InvalidTimestamp(ms))
}
