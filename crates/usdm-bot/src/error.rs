//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] usdm_store::StoreError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] usdm_exchange::ExchangeError),

    #[error("Registry error: {0}")]
    Registry(#[from] usdm_registry::RegistryError),

    #[error("Engine error: {0}")]
    Engine(#[from] usdm_engine::EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
