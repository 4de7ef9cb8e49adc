//! Cached per-symbol trading rules.

use crate::error::RegistryResult;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use usdm_exchange::{ExchangeApi, ExchangeInfo};

/// Steps a symbol's orders must be quantized to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRule {
    /// `PRICE_FILTER.tickSize`, verbatim from the exchange.
    pub price_step: String,
    /// `LOT_SIZE.stepSize`, verbatim from the exchange.
    pub quantity_step: String,
}

/// One immutable fetch result.
///
/// Contains rules only for symbols in `TRADING` status that declare both
/// step filters. Rebuilt wholesale on refresh, never patched.
#[derive(Debug, Clone)]
pub struct RuleSnapshot {
    pub rules: HashMap<String, SymbolRule>,
    pub fetched_at: DateTime<Utc>,
}

impl RuleSnapshot {
    fn from_exchange_info(info: &ExchangeInfo, fetched_at: DateTime<Utc>) -> Self {
        let rules = info
            .symbols
            .iter()
            .filter(|s| s.is_trading())
            .filter_map(|s| {
                let rule = SymbolRule {
                    price_step: s.price_step()?.to_string(),
                    quantity_step: s.quantity_step()?.to_string(),
                };
                Some((s.symbol.clone(), rule))
            })
            .collect();
        Self { rules, fetched_at }
    }

    /// Rule for one symbol, `None` when the symbol is not tradable.
    pub fn rule(&self, symbol: &str) -> Option<&SymbolRule> {
        self.rules.get(symbol)
    }
}

/// Exchange-wide rule cache with manual invalidation.
///
/// There is no TTL: staleness is resolved only by calling
/// `snapshot(true)`. A failed refresh leaves the previous snapshot
/// untouched and propagates the error.
pub struct SymbolRuleCache {
    client: Arc<dyn ExchangeApi>,
    inner: RwLock<Option<Arc<RuleSnapshot>>>,
}

impl SymbolRuleCache {
    /// Create an empty cache backed by a public exchange client.
    pub fn new(client: Arc<dyn ExchangeApi>) -> Self {
        Self {
            client,
            inner: RwLock::new(None),
        }
    }

    /// The cached snapshot, if any, without touching the network.
    pub fn cached(&self) -> Option<Arc<RuleSnapshot>> {
        self.inner.read().clone()
    }

    /// Return the current snapshot, fetching when forced or empty.
    ///
    /// The fetch happens outside the lock; the swap is a single
    /// assignment of a fresh `Arc`, so readers observe either the old or
    /// the new snapshot in full.
    pub async fn snapshot(&self, force_refresh: bool) -> RegistryResult<Arc<RuleSnapshot>> {
        if !force_refresh {
            if let Some(snapshot) = self.cached() {
                return Ok(snapshot);
            }
        }

        debug!(force_refresh, "Fetching exchange trading rules");
        let info = self.client.exchange_info().await?;
        let snapshot = Arc::new(RuleSnapshot::from_exchange_info(&info, Utc::now()));
        info!(
            symbols = snapshot.rules.len(),
            "Symbol rule snapshot replaced"
        );
        *self.inner.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
