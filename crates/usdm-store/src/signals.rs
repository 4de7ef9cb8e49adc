//! Signal queries.

use crate::accounts::account_from_row;
use crate::db::{datetime_from_ms, SqliteStore};
use crate::error::StoreResult;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use usdm_core::{Account, ClientOrderId, Intent, OrderAttempt, Side, Signal};

/// Fields required to ingest a signal.
///
/// The client order id is not part of this struct on purpose: it is
/// generated exactly once, inside `insert_signal`.
#[derive(Debug, Clone)]
pub struct NewSignal {
    pub account_id: i64,
    pub symbol: String,
    pub side: Side,
    pub intent: Intent,
    pub price: f64,
    pub event_time: DateTime<Utc>,
}

/// One row of the signal listing: the signal, its owner, and the latest
/// attempts joined by client order id.
#[derive(Debug, Clone)]
pub struct SignalListing {
    pub account: Account,
    pub signal: Signal,
    pub attempt: Option<OrderAttempt>,
}

pub(crate) fn signal_from_row(row: &SqliteRow, prefix: &str) -> StoreResult<Signal> {
    let col = |name: &str| format!("{prefix}{name}");
    let client_order_id: String = row.try_get(col("client_order_id").as_str())?;
    let side: String = row.try_get(col("side").as_str())?;
    let intent: String = row.try_get(col("intent").as_str())?;
    let event_time: i64 = row.try_get(col("event_time").as_str())?;
    let created_at: i64 = row.try_get(col("created_at").as_str())?;
    Ok(Signal {
        id: row.try_get(col("id").as_str())?,
        account_id: row.try_get(col("account_id").as_str())?,
        client_order_id: ClientOrderId::from_string(client_order_id),
        symbol: row.try_get(col("symbol").as_str())?,
        side: side.parse()?,
        intent: intent.parse()?,
        price: row.try_get(col("price").as_str())?,
        event_time: datetime_from_ms(event_time)?,
        created_at: datetime_from_ms(created_at)?,
    })
}

fn placeholders(count: usize) -> String {
    std::iter::repeat("?").take(count).collect::<Vec<_>>().join(", ")
}

const SIGNAL_WITH_ACCOUNT_COLUMNS: &str = r#"
    s.id, s.account_id, s.client_order_id, s.symbol, s.side, s.intent,
    s.price, s.event_time, s.created_at,
    a.id AS a_id, a.name AS a_name, a.api_key AS a_api_key,
    a.secret AS a_secret, a.budget AS a_budget, a.interval AS a_interval
"#;

impl SqliteStore {
    /// Ingest a signal, generating its client order identifier.
    pub async fn insert_signal(&self, signal: NewSignal) -> StoreResult<Signal> {
        let client_order_id = ClientOrderId::new();
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
                INSERT INTO signals
                    (account_id, client_order_id, symbol, side, intent, price, event_time, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(signal.account_id)
        .bind(client_order_id.as_str())
        .bind(&signal.symbol)
        .bind(signal.side.to_string())
        .bind(signal.intent.to_string())
        .bind(signal.price)
        .bind(signal.event_time.timestamp_millis())
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(Signal {
            id: result.last_insert_rowid(),
            account_id: signal.account_id,
            client_order_id,
            symbol: signal.symbol,
            side: signal.side,
            intent: signal.intent,
            price: signal.price,
            event_time: signal.event_time,
            created_at,
        })
    }

    /// Load signals by id together with their owning accounts.
    ///
    /// Unknown ids are silently absent from the result. Row order follows
    /// signal id, which matches ingestion order.
    pub async fn signals_with_accounts(&self, ids: &[i64]) -> StoreResult<Vec<(Account, Signal)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
                SELECT {SIGNAL_WITH_ACCOUNT_COLUMNS}
                FROM signals s
                INNER JOIN accounts a ON a.id = s.account_id
                WHERE s.id IN ({})
                ORDER BY s.id
            "#,
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| Ok((account_from_row(row, "a_")?, signal_from_row(row, "")?)))
            .collect()
    }

    /// Every stored signal with its owning account, in ingestion order.
    pub async fn all_signals_with_accounts(&self) -> StoreResult<Vec<(Account, Signal)>> {
        let sql = format!(
            r#"
                SELECT {SIGNAL_WITH_ACCOUNT_COLUMNS}
                FROM signals s
                INNER JOIN accounts a ON a.id = s.account_id
                ORDER BY s.id
            "#
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| Ok((account_from_row(row, "a_")?, signal_from_row(row, "")?)))
            .collect()
    }

    /// Delete signals by id. Attempt rows cascade away with them; this is
    /// how the expired-signal sweep drops dead signals.
    pub async fn delete_signals(&self, ids: &[i64]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM signals WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Dashboard-style listing: signals joined with accounts and their
    /// attempts by client order id, newest signals and attempts first.
    pub async fn list_signals_with_attempts(&self) -> StoreResult<Vec<SignalListing>> {
        let sql = format!(
            r#"
                SELECT {SIGNAL_WITH_ACCOUNT_COLUMNS},
                    oa.id AS oa_id, oa.signal_id AS oa_signal_id,
                    oa.client_order_id AS oa_client_order_id,
                    oa.status AS oa_status, oa.response AS oa_response,
                    oa.created_at AS oa_created_at
                FROM signals s
                INNER JOIN accounts a ON a.id = s.account_id
                LEFT JOIN order_attempts oa ON oa.client_order_id = s.client_order_id
                ORDER BY s.event_time DESC, oa.id DESC
            "#
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let attempt = match row.try_get::<Option<i64>, _>("oa_id")? {
                    Some(_) => Some(crate::attempts::attempt_from_row(row, "oa_")?),
                    None => None,
                };
                Ok(SignalListing {
                    account: account_from_row(row, "a_")?,
                    signal: signal_from_row(row, "")?,
                    attempt,
                })
            })
            .collect()
    }
}
