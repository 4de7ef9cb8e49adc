//! Registry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] usdm_exchange::ExchangeError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
