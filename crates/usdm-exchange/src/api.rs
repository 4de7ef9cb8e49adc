//! The exchange seam consumed by the cache and the engine.

use crate::error::ExchangeResult;
use crate::types::{ExchangeInfo, OrderAck, OrderRequest, Position};
use async_trait::async_trait;

/// Calls the engine makes against the exchange.
///
/// Every method is a fallible network round trip. Object-safe so the
/// engine can hold per-account clients behind `Arc<dyn ExchangeApi>`,
/// and mockable for tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Exchange-wide symbol trading rules. Public endpoint.
    async fn exchange_info(&self) -> ExchangeResult<ExchangeInfo>;

    /// Current positions for the authenticated account. Signed endpoint.
    async fn open_positions(&self) -> ExchangeResult<Vec<Position>>;

    /// Submit one order. Signed endpoint.
    async fn submit_order(&self, request: &OrderRequest) -> ExchangeResult<OrderAck>;
}
