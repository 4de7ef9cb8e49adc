//! Order-attempt queries. Append-only: attempts are inserted and read,
//! never updated or deleted individually.

use crate::db::{datetime_from_ms, SqliteStore};
use crate::error::StoreResult;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use usdm_core::{AttemptOutcome, ClientOrderId, OrderAttempt, Signal};

pub(crate) fn attempt_from_row(row: &SqliteRow, prefix: &str) -> StoreResult<OrderAttempt> {
    let col = |name: &str| format!("{prefix}{name}");
    let client_order_id: String = row.try_get(col("client_order_id").as_str())?;
    let status: String = row.try_get(col("status").as_str())?;
    let created_at: i64 = row.try_get(col("created_at").as_str())?;
    Ok(OrderAttempt {
        id: row.try_get(col("id").as_str())?,
        signal_id: row.try_get(col("signal_id").as_str())?,
        client_order_id: ClientOrderId::from_string(client_order_id),
        status: status.parse()?,
        response: row.try_get(col("response").as_str())?,
        created_at: datetime_from_ms(created_at)?,
    })
}

impl SqliteStore {
    /// Append one attempt row for a submission outcome.
    pub async fn insert_attempt(
        &self,
        signal: &Signal,
        outcome: &AttemptOutcome,
    ) -> StoreResult<OrderAttempt> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
                INSERT INTO order_attempts
                    (signal_id, client_order_id, status, response, created_at)
                VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(signal.id)
        .bind(signal.client_order_id.as_str())
        .bind(outcome.status().to_string())
        .bind(outcome.payload())
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(OrderAttempt {
            id: result.last_insert_rowid(),
            signal_id: signal.id,
            client_order_id: signal.client_order_id.clone(),
            status: outcome.status(),
            response: outcome.payload().to_string(),
            created_at,
        })
    }

    /// All attempts recorded for one client order identifier, oldest first.
    pub async fn attempts_by_client_order_id(
        &self,
        client_order_id: &str,
    ) -> StoreResult<Vec<OrderAttempt>> {
        let rows = sqlx::query(
            "SELECT * FROM order_attempts WHERE client_order_id = ? ORDER BY id",
        )
        .bind(client_order_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|r| attempt_from_row(r, "")).collect()
    }
}
