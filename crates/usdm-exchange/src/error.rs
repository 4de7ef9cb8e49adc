//! Exchange client error types.

use thiserror::Error;

/// Errors surfaced by exchange calls.
///
/// Every call is a network round trip and may fail; callers never assume
/// a response.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Exchange rejected request (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Signed endpoint called without credentials")]
    MissingCredentials,
}

/// Result type alias for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
