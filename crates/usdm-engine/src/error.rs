//! Engine error types.
//!
//! Only operations with no way to produce a partial result surface these
//! (signal loading, the expired sweep). Submission failures never become
//! an `EngineError`; they are recorded as failure attempts instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] usdm_store::StoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] usdm_registry::RegistryError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] usdm_exchange::ExchangeError),
}

pub type EngineResult<T> = Result<T, EngineError>;
