//! Attempt recorder: the audit trail for "did this signal's order go
//! through".

use serde_json::json;
use std::sync::Arc;
use tracing::error;
use usdm_core::{AttemptOutcome, Signal};
use usdm_exchange::ExchangeError;
use usdm_store::SqliteStore;

/// Persists one append-only attempt row per submission outcome.
pub struct AttemptRecorder {
    store: Arc<SqliteStore>,
}

impl AttemptRecorder {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Record an outcome for `signal`. Write failures are logged and
    /// swallowed: a lost audit row must not fail sibling submissions.
    pub async fn record(&self, signal: &Signal, outcome: &AttemptOutcome) {
        if let Err(e) = self.store.insert_attempt(signal, outcome).await {
            error!(
                signal_id = signal.id,
                client_order_id = %signal.client_order_id,
                error = %e,
                "Failed to record order attempt"
            );
        }
    }
}

/// Serialize a submission error into the failure attempt payload.
pub fn serialize_error(error: &ExchangeError) -> String {
    json!({ "message": error.to_string() }).to_string()
}
