//! Account queries.

use crate::db::SqliteStore;
use crate::error::StoreResult;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use usdm_core::{Account, Interval};

/// Fields required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub api_key: String,
    pub secret: String,
    pub budget: f64,
    pub interval: Interval,
}

pub(crate) fn account_from_row(row: &SqliteRow, prefix: &str) -> StoreResult<Account> {
    let col = |name: &str| format!("{prefix}{name}");
    let interval: String = row.try_get(col("interval").as_str())?;
    Ok(Account {
        id: row.try_get(col("id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        api_key: row.try_get(col("api_key").as_str())?,
        secret: row.try_get(col("secret").as_str())?,
        budget: row.try_get(col("budget").as_str())?,
        interval: interval.parse()?,
    })
}

impl SqliteStore {
    /// Insert a new account and return it with its assigned id.
    pub async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let result = sqlx::query(
            r#"
                INSERT INTO accounts (name, api_key, secret, budget, interval)
                VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.name)
        .bind(&account.api_key)
        .bind(&account.secret)
        .bind(account.budget)
        .bind(account.interval.to_string())
        .execute(&self.pool)
        .await?;

        Ok(Account {
            id: result.last_insert_rowid(),
            name: account.name,
            api_key: account.api_key,
            secret: account.secret,
            budget: account.budget,
            interval: account.interval,
        })
    }

    pub async fn account_by_id(&self, id: i64) -> StoreResult<Option<Account>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(|r| account_from_row(r, "")).transpose()
    }

    pub async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query("SELECT * FROM accounts ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| account_from_row(r, "")).collect()
    }

    /// Delete an account; owned signals and attempts cascade.
    pub async fn delete_account(&self, id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
