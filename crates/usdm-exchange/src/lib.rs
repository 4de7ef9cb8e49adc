//! Binance USDM futures REST client.
//!
//! Thin, typed wrapper over the three endpoints the engine needs:
//! order submission, open positions, and exchange trading rules. The
//! `ExchangeApi` trait is the seam everything upstream mocks in tests.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::ExchangeApi;
pub use client::{UsdmClient, DEFAULT_BASE_URL};
pub use error::{ExchangeError, ExchangeResult};
pub use types::{ExchangeInfo, OrderAck, OrderRequest, Position, SymbolFilter, SymbolInfo};
