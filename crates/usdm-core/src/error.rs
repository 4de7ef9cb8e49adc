//! Error types for usdm-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid side: {0}")]
    InvalidSide(String),

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    #[error("Invalid attempt status: {0}")]
    InvalidAttemptStatus(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
