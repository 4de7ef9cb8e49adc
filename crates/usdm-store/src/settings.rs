//! Global settings record.
//!
//! A single mutable row (enforced by the schema) holding parameters that
//! affect how signed exchange clients are constructed.

use crate::db::SqliteStore;
use crate::error::StoreResult;
use sqlx::Row;
use usdm_core::GlobalSettings;

impl SqliteStore {
    pub async fn global_settings(&self) -> StoreResult<GlobalSettings> {
        let row = sqlx::query("SELECT recv_window FROM settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        let recv_window: i64 = row.try_get("recv_window")?;
        Ok(GlobalSettings {
            recv_window: recv_window as u64,
        })
    }

    pub async fn update_global_settings(&self, settings: &GlobalSettings) -> StoreResult<()> {
        sqlx::query("UPDATE settings SET recv_window = ? WHERE id = 1")
            .bind(settings.recv_window as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
