//! Store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(#[from] usdm_core::CoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;
