//! Application wiring.
//!
//! Connects the store, the public exchange client behind the rule cache,
//! and the per-account client factory into one `ExecutionEngine`, and
//! exposes the operations the CLI dispatches to.

use crate::config::BotConfig;
use crate::error::AppResult;
use std::sync::Arc;
use tracing::info;
use usdm_core::Account;
use usdm_engine::{ClientFactory, ExecutionEngine};
use usdm_exchange::{ExchangeApi, ExchangeError, ExchangeResult, UsdmClient};
use usdm_registry::{RuleSnapshot, SymbolRuleCache};
use usdm_store::{SignalListing, SqliteStore};

/// Builds a signed REST client from an account's credential pair.
struct UsdmClientFactory {
    base_url: String,
}

impl ClientFactory for UsdmClientFactory {
    fn for_account(
        &self,
        account: &Account,
        recv_window: u64,
    ) -> ExchangeResult<Arc<dyn ExchangeApi>> {
        if account.api_key.is_empty() || account.secret.is_empty() {
            return Err(ExchangeError::MissingCredentials);
        }
        let client = UsdmClient::signed(
            self.base_url.clone(),
            account.api_key.clone(),
            account.secret.clone(),
            recv_window,
        )?;
        Ok(Arc::new(client))
    }
}

/// Main application.
pub struct Application {
    store: Arc<SqliteStore>,
    rules: Arc<SymbolRuleCache>,
    engine: ExecutionEngine,
}

impl Application {
    /// Open the database and construct the engine.
    pub async fn new(config: BotConfig) -> AppResult<Self> {
        let store = Arc::new(SqliteStore::connect(&config.database).await?);

        let public = UsdmClient::public(config.base_url.clone())?;
        let rules = Arc::new(SymbolRuleCache::new(Arc::new(public)));

        let factory = Arc::new(UsdmClientFactory {
            base_url: config.base_url,
        });
        let engine = ExecutionEngine::new(Arc::clone(&store), Arc::clone(&rules), factory);

        Ok(Self {
            store,
            rules,
            engine,
        })
    }

    /// Execute the given signals.
    pub async fn process(&self, ids: &[i64]) {
        self.engine.process_by_ids(ids).await;
    }

    /// Delete signals past their validity window.
    pub async fn sweep_expired(&self) -> AppResult<usize> {
        Ok(self.engine.sweep_expired().await?)
    }

    /// Force-refresh the symbol rule snapshot.
    pub async fn refresh_rules(&self) -> AppResult<Arc<RuleSnapshot>> {
        let snapshot = self.rules.snapshot(true).await?;
        info!(symbols = snapshot.rules.len(), "Symbol rules refreshed");
        Ok(snapshot)
    }

    /// Signals joined with their accounts and attempts, newest first.
    pub async fn list_signals(&self) -> AppResult<Vec<SignalListing>> {
        Ok(self.store.list_signals_with_attempts().await?)
    }
}
