//! Integration tests against an in-memory database.

use chrono::{Duration, Utc};
use usdm_core::{AttemptOutcome, AttemptStatus, Intent, Interval, Side};
use usdm_store::{NewAccount, NewSignal, SqliteStore};

fn account(name: &str) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        api_key: format!("{name}-key"),
        secret: format!("{name}-secret"),
        budget: 100.0,
        interval: Interval::Minutes15,
    }
}

fn signal(account_id: i64, symbol: &str, intent: Intent) -> NewSignal {
    NewSignal {
        account_id,
        symbol: symbol.to_string(),
        side: Side::Long,
        intent,
        price: 30000.95,
        event_time: Utc::now(),
    }
}

#[tokio::test]
async fn test_signal_insert_generates_unique_client_order_ids() {
    let store = SqliteStore::connect_in_memory().await.unwrap();
    let acct = store.insert_account(account("alpha")).await.unwrap();

    let s1 = store
        .insert_signal(signal(acct.id, "BTCUSDT", Intent::Open))
        .await
        .unwrap();
    let s2 = store
        .insert_signal(signal(acct.id, "BTCUSDT", Intent::Open))
        .await
        .unwrap();

    assert_ne!(s1.client_order_id, s2.client_order_id);
    assert!(s1.client_order_id.as_str().starts_with("sig_"));
}

#[tokio::test]
async fn test_signals_with_accounts_join_and_order() {
    let store = SqliteStore::connect_in_memory().await.unwrap();
    let a1 = store.insert_account(account("alpha")).await.unwrap();
    let a2 = store.insert_account(account("beta")).await.unwrap();

    let s1 = store
        .insert_signal(signal(a1.id, "BTCUSDT", Intent::Open))
        .await
        .unwrap();
    let s2 = store
        .insert_signal(signal(a2.id, "ETHUSDT", Intent::Close))
        .await
        .unwrap();
    let s3 = store
        .insert_signal(signal(a1.id, "SOLUSDT", Intent::TakeProfit))
        .await
        .unwrap();

    // Unknown id 999 is silently absent.
    let rows = store
        .signals_with_accounts(&[s1.id, s2.id, s3.id, 999])
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].1.id, s1.id);
    assert_eq!(rows[0].0.name, "alpha");
    assert_eq!(rows[1].0.name, "beta");
    assert_eq!(rows[2].1.intent, Intent::TakeProfit);
}

#[tokio::test]
async fn test_attempts_are_append_only_per_client_order_id() {
    let store = SqliteStore::connect_in_memory().await.unwrap();
    let acct = store.insert_account(account("alpha")).await.unwrap();
    let sig = store
        .insert_signal(signal(acct.id, "BTCUSDT", Intent::Open))
        .await
        .unwrap();

    store
        .insert_attempt(&sig, &AttemptOutcome::Failure("{\"message\":\"down\"}".into()))
        .await
        .unwrap();
    store
        .insert_attempt(&sig, &AttemptOutcome::Success("{\"orderId\":1}".into()))
        .await
        .unwrap();

    let attempts = store
        .attempts_by_client_order_id(sig.client_order_id.as_str())
        .await
        .unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].status, AttemptStatus::Failure);
    assert_eq!(attempts[1].status, AttemptStatus::Success);
    assert!(attempts
        .iter()
        .all(|a| a.client_order_id == sig.client_order_id));
}

#[tokio::test]
async fn test_delete_signals_cascades_attempts() {
    let store = SqliteStore::connect_in_memory().await.unwrap();
    let acct = store.insert_account(account("alpha")).await.unwrap();
    let sig = store
        .insert_signal(signal(acct.id, "BTCUSDT", Intent::Open))
        .await
        .unwrap();
    store
        .insert_attempt(&sig, &AttemptOutcome::Success("{}".into()))
        .await
        .unwrap();

    let deleted = store.delete_signals(&[sig.id]).await.unwrap();
    assert_eq!(deleted, 1);
    let attempts = store
        .attempts_by_client_order_id(sig.client_order_id.as_str())
        .await
        .unwrap();
    assert!(attempts.is_empty());
}

#[tokio::test]
async fn test_listing_joins_attempts_newest_first() {
    let store = SqliteStore::connect_in_memory().await.unwrap();
    let acct = store.insert_account(account("alpha")).await.unwrap();

    let old = store
        .insert_signal(NewSignal {
            event_time: Utc::now() - Duration::hours(2),
            ..signal(acct.id, "BTCUSDT", Intent::Open)
        })
        .await
        .unwrap();
    let recent = store
        .insert_signal(signal(acct.id, "ETHUSDT", Intent::Open))
        .await
        .unwrap();
    store
        .insert_attempt(&old, &AttemptOutcome::Success("{}".into()))
        .await
        .unwrap();

    let listing = store.list_signals_with_attempts().await.unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].signal.id, recent.id);
    assert!(listing[0].attempt.is_none());
    assert_eq!(listing[1].signal.id, old.id);
    assert_eq!(
        listing[1].attempt.as_ref().map(|a| a.status),
        Some(AttemptStatus::Success)
    );
}
