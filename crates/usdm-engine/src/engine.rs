//! Execution orchestrator.
//!
//! Entry points fan signal batches out to the exchange with settle-all
//! semantics: every pipeline and every per-signal submission is isolated,
//! so one bad credential, symbol, or network hiccup never aborts sibling
//! work. Outcomes surface only as recorded attempts; `process` and
//! `process_by_ids` intentionally return nothing.

use crate::builders::{build_close_order, build_open_order, build_take_profit_order};
use crate::classifier::classify;
use crate::error::EngineResult;
use crate::recorder::{serialize_error, AttemptRecorder};
use chrono::Utc;
use futures_util::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use usdm_core::{is_expired, Account, AttemptOutcome, Signal};
use usdm_exchange::{ExchangeApi, ExchangeResult, OrderRequest};
use usdm_registry::SymbolRuleCache;
use usdm_store::SqliteStore;

/// Builds one signed exchange client per account.
///
/// The engine owns no credentials; it asks the factory at dispatch time
/// so the stored `recv_window` setting is honored per batch.
pub trait ClientFactory: Send + Sync {
    fn for_account(
        &self,
        account: &Account,
        recv_window: u64,
    ) -> ExchangeResult<Arc<dyn ExchangeApi>>;
}

/// Top-level signal execution engine.
pub struct ExecutionEngine {
    store: Arc<SqliteStore>,
    rules: Arc<SymbolRuleCache>,
    clients: Arc<dyn ClientFactory>,
    recorder: AttemptRecorder,
}

impl ExecutionEngine {
    pub fn new(
        store: Arc<SqliteStore>,
        rules: Arc<SymbolRuleCache>,
        clients: Arc<dyn ClientFactory>,
    ) -> Self {
        let recorder = AttemptRecorder::new(Arc::clone(&store));
        Self {
            store,
            rules,
            clients,
            recorder,
        }
    }

    /// Load signals by id, group them by owning account, and process all
    /// groups concurrently.
    ///
    /// The externally invocable entry point: the whole batch reaches
    /// settlement even when several accounts or symbols fail. Errors are
    /// observable only through recorded attempts.
    pub async fn process_by_ids(&self, ids: &[i64]) {
        if ids.is_empty() {
            return;
        }
        let settings = match self.store.global_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Failed to load global settings, batch skipped");
                return;
            }
        };
        let rows = match self.store.signals_with_accounts(ids).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Failed to load signals, batch skipped");
                return;
            }
        };
        info!(requested = ids.len(), loaded = rows.len(), "Processing signal batch");

        let groups = group_by_account(rows);
        let tasks = groups.into_iter().filter_map(|(account, signals)| {
            match self.clients.for_account(&account, settings.recv_window) {
                Ok(client) => Some(async move {
                    self.process(client, &account, signals).await;
                }),
                Err(e) => {
                    warn!(
                        account = %account.name,
                        error = %e,
                        "Failed to construct exchange client, account group skipped"
                    );
                    None
                }
            }
        });
        join_all(tasks).await;
    }

    /// Process one account's signals: classify, then run the three intent
    /// pipelines concurrently and independently.
    pub async fn process(
        &self,
        client: Arc<dyn ExchangeApi>,
        account: &Account,
        signals: Vec<Signal>,
    ) {
        let batch = classify(signals);
        tokio::join!(
            self.run_close_pipeline(&client, account, batch.close),
            self.run_open_pipeline(&client, account, batch.open),
            self.run_take_profit_pipeline(&client, account, batch.take_profit),
        );
    }

    /// Delete signals that have outlived their account's validity window.
    ///
    /// Attempt rows for surviving signals are untouched; deleted signals
    /// take their attempts with them.
    pub async fn sweep_expired(&self) -> EngineResult<usize> {
        let rows = self.store.all_signals_with_accounts().await?;
        let now = Utc::now();
        let ids: Vec<i64> = rows
            .iter()
            .filter(|(account, signal)| {
                is_expired(signal.event_time, now, account.interval.window_ms())
            })
            .map(|(_, signal)| signal.id)
            .collect();
        let deleted = self.store.delete_signals(&ids).await?;
        info!(deleted, "Swept expired signals");
        Ok(deleted as usize)
    }

    async fn run_close_pipeline(
        &self,
        client: &Arc<dyn ExchangeApi>,
        account: &Account,
        signals: Vec<Signal>,
    ) {
        if signals.is_empty() {
            return;
        }
        // One positions query per batch, not per signal.
        let positions = match client.open_positions().await {
            Ok(positions) => positions,
            Err(e) => {
                warn!(
                    account = %account.name,
                    error = %e,
                    "Positions unavailable, close signals skipped this cycle"
                );
                return;
            }
        };
        let submissions = signals.into_iter().filter_map(|signal| {
            build_close_order(&signal, &positions)
                .map(|request| self.submit_and_record(Arc::clone(client), signal, request))
        });
        join_all(submissions).await;
    }

    async fn run_open_pipeline(
        &self,
        client: &Arc<dyn ExchangeApi>,
        account: &Account,
        signals: Vec<Signal>,
    ) {
        if signals.is_empty() {
            return;
        }
        let rules = match self.rules.snapshot(false).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(
                    account = %account.name,
                    error = %e,
                    "Symbol rules unavailable, open signals skipped this cycle"
                );
                return;
            }
        };
        let now = Utc::now();
        let submissions = signals.into_iter().filter_map(|signal| {
            build_open_order(&signal, account.budget, account.interval, &rules, now)
                .map(|request| self.submit_and_record(Arc::clone(client), signal, request))
        });
        join_all(submissions).await;
    }

    async fn run_take_profit_pipeline(
        &self,
        client: &Arc<dyn ExchangeApi>,
        account: &Account,
        signals: Vec<Signal>,
    ) {
        if signals.is_empty() {
            return;
        }
        let rules = match self.rules.snapshot(false).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(
                    account = %account.name,
                    error = %e,
                    "Symbol rules unavailable, take-profit signals skipped this cycle"
                );
                return;
            }
        };
        let now = Utc::now();
        let submissions = signals.into_iter().filter_map(|signal| {
            build_take_profit_order(&signal, account.interval, &rules, now)
                .map(|request| self.submit_and_record(Arc::clone(client), signal, request))
        });
        join_all(submissions).await;
    }

    /// Submit one order and record its outcome, exactly once, regardless
    /// of how the submission fares.
    async fn submit_and_record(
        &self,
        client: Arc<dyn ExchangeApi>,
        signal: Signal,
        request: OrderRequest,
    ) {
        let outcome = match client.submit_order(&request).await {
            Ok(ack) => {
                debug!(
                    signal_id = signal.id,
                    order_id = ack.order_id,
                    status = %ack.status,
                    "Order accepted"
                );
                let raw = serde_json::to_string(&ack)
                    .unwrap_or_else(|e| json!({ "message": e.to_string() }).to_string());
                AttemptOutcome::Success(raw)
            }
            Err(e) => {
                warn!(
                    signal_id = signal.id,
                    client_order_id = %signal.client_order_id,
                    error = %e,
                    "Order submission failed"
                );
                AttemptOutcome::Failure(serialize_error(&e))
            }
        };
        self.recorder.record(&signal, &outcome).await;
    }
}

/// Group account/signal rows into per-account batches, preserving
/// first-seen account order and signal order within each group.
fn group_by_account(rows: Vec<(Account, Signal)>) -> Vec<(Account, Vec<Signal>)> {
    let mut groups: Vec<(Account, Vec<Signal>)> = Vec::new();
    for (account, signal) in rows {
        match groups.iter_mut().find(|(a, _)| a.id == account.id) {
            Some((_, signals)) => signals.push(signal),
            None => groups.push((account, vec![signal])),
        }
    }
    groups
}
