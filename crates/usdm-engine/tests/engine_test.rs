//! End-to-end engine tests against an in-memory store and a mocked
//! exchange: batches settle fully, every submission leaves an attempt
//! row, and per-signal failures stay contained.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use usdm_core::{Account, AttemptStatus, Intent, Interval, OrderSide, OrderType, Side, Signal};
use usdm_engine::{ClientFactory, ExecutionEngine};
use usdm_exchange::{
    ExchangeApi, ExchangeError, ExchangeInfo, ExchangeResult, OrderAck, OrderRequest, Position,
    SymbolFilter, SymbolInfo,
};
use usdm_registry::SymbolRuleCache;
use usdm_store::{NewAccount, NewSignal, SqliteStore};

mockall::mock! {
    Exchange {}

    #[async_trait]
    impl ExchangeApi for Exchange {
        async fn exchange_info(&self) -> ExchangeResult<ExchangeInfo>;
        async fn open_positions(&self) -> ExchangeResult<Vec<Position>>;
        async fn submit_order(&self, request: &OrderRequest) -> ExchangeResult<OrderAck>;
    }
}

/// Hands every account the same mocked client.
struct FixedClientFactory(Arc<dyn ExchangeApi>);

impl ClientFactory for FixedClientFactory {
    fn for_account(&self, _: &Account, _: u64) -> ExchangeResult<Arc<dyn ExchangeApi>> {
        Ok(Arc::clone(&self.0))
    }
}

/// Refuses accounts by name, to exercise group isolation.
struct SelectiveClientFactory {
    client: Arc<dyn ExchangeApi>,
    refuse: String,
}

impl ClientFactory for SelectiveClientFactory {
    fn for_account(&self, account: &Account, _: u64) -> ExchangeResult<Arc<dyn ExchangeApi>> {
        if account.name == self.refuse {
            Err(ExchangeError::MissingCredentials)
        } else {
            Ok(Arc::clone(&self.client))
        }
    }
}

fn trading_symbol(name: &str, tick: &str, step: &str) -> SymbolInfo {
    SymbolInfo {
        symbol: name.to_string(),
        status: "TRADING".to_string(),
        filters: vec![
            SymbolFilter {
                filter_type: "PRICE_FILTER".to_string(),
                tick_size: Some(tick.to_string()),
                step_size: None,
            },
            SymbolFilter {
                filter_type: "LOT_SIZE".to_string(),
                tick_size: None,
                step_size: Some(step.to_string()),
            },
        ],
    }
}

fn exchange_rules() -> ExchangeInfo {
    ExchangeInfo {
        symbols: vec![
            trading_symbol("BTCUSDT", "0.10", "0.001"),
            trading_symbol("ETHUSDT", "0.01", "0.01"),
        ],
    }
}

fn ack_for(request: &OrderRequest) -> OrderAck {
    OrderAck {
        order_id: 4021,
        symbol: request.symbol.clone(),
        status: "NEW".to_string(),
        client_order_id: request.client_order_id.to_string(),
        extra: serde_json::Map::new(),
    }
}

fn position(symbol: &str, amt: &str) -> Position {
    Position {
        symbol: symbol.to_string(),
        position_amt: amt.parse().unwrap(),
        entry_price: "30000".parse().unwrap(),
    }
}

async fn store_with_account(interval: Interval) -> (Arc<SqliteStore>, Account) {
    let store = Arc::new(SqliteStore::connect_in_memory().await.unwrap());
    let account = store
        .insert_account(NewAccount {
            name: "main".to_string(),
            api_key: "key".to_string(),
            secret: "secret".to_string(),
            budget: 100.0,
            interval,
        })
        .await
        .unwrap();
    (store, account)
}

async fn insert_signal(
    store: &SqliteStore,
    account_id: i64,
    symbol: &str,
    side: Side,
    intent: Intent,
    price: f64,
) -> Signal {
    store
        .insert_signal(NewSignal {
            account_id,
            symbol: symbol.to_string(),
            side,
            intent,
            price,
            event_time: Utc::now(),
        })
        .await
        .unwrap()
}

/// Engine wired to a pre-warmed rule cache and the given trade client.
async fn engine_with(
    store: Arc<SqliteStore>,
    factory: Arc<dyn ClientFactory>,
) -> ExecutionEngine {
    let mut rules_source = MockExchange::new();
    rules_source
        .expect_exchange_info()
        .returning(|| Ok(exchange_rules()));
    let cache = Arc::new(SymbolRuleCache::new(Arc::new(rules_source)));
    cache.snapshot(false).await.unwrap();
    ExecutionEngine::new(store, cache, factory)
}

#[tokio::test]
async fn test_one_failure_among_five_opens_still_records_five_attempts() {
    let (store, account) = store_with_account(Interval::Minutes15).await;
    let mut signals = Vec::new();
    for _ in 0..5 {
        signals.push(
            insert_signal(&store, account.id, "BTCUSDT", Side::Long, Intent::Open, 30000.0).await,
        );
    }
    let poisoned = signals[2].client_order_id.clone();

    let mut exchange = MockExchange::new();
    exchange.expect_submit_order().times(5).returning(move |request| {
        if request.client_order_id == poisoned {
            Err(ExchangeError::Api {
                status: 400,
                body: "Margin is insufficient.".to_string(),
            })
        } else {
            Ok(ack_for(request))
        }
    });

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(FixedClientFactory(Arc::new(exchange))),
    )
    .await;
    let ids: Vec<i64> = signals.iter().map(|s| s.id).collect();
    engine.process_by_ids(&ids).await;

    let mut successes = 0;
    let mut failures = 0;
    for signal in &signals {
        let attempts = store
            .attempts_by_client_order_id(signal.client_order_id.as_str())
            .await
            .unwrap();
        assert_eq!(attempts.len(), 1, "every signal gets exactly one attempt");
        match attempts[0].status {
            AttemptStatus::Success => successes += 1,
            AttemptStatus::Failure => failures += 1,
        }
    }
    assert_eq!(successes, 4);
    assert_eq!(failures, 1);

    let failed = store
        .attempts_by_client_order_id(signals[2].client_order_id.as_str())
        .await
        .unwrap();
    assert_eq!(failed[0].status, AttemptStatus::Failure);
    assert!(failed[0].response.contains("Margin is insufficient."));
}

#[tokio::test]
async fn test_retry_reuses_the_same_client_order_id() {
    let (store, account) = store_with_account(Interval::Hour1).await;
    let signal =
        insert_signal(&store, account.id, "BTCUSDT", Side::Long, Intent::Open, 30000.0).await;

    let submitted_ids: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&submitted_ids);
    let mut exchange = MockExchange::new();
    exchange.expect_submit_order().times(2).returning(move |request| {
        let mut seen = seen.lock().unwrap();
        seen.push(request.client_order_id.to_string());
        if seen.len() == 1 {
            Err(ExchangeError::Api {
                status: 503,
                body: "Service unavailable.".to_string(),
            })
        } else {
            Ok(ack_for(request))
        }
    });

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(FixedClientFactory(Arc::new(exchange))),
    )
    .await;
    engine.process_by_ids(&[signal.id]).await;
    engine.process_by_ids(&[signal.id]).await;

    let submitted = submitted_ids.lock().unwrap();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0], submitted[1]);
    assert_eq!(submitted[0], signal.client_order_id.to_string());

    let attempts = store
        .attempts_by_client_order_id(signal.client_order_id.as_str())
        .await
        .unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].status, AttemptStatus::Failure);
    assert_eq!(attempts[1].status, AttemptStatus::Success);
}

#[tokio::test]
async fn test_close_signal_inverts_side_and_strips_position_sign() {
    let (store, account) = store_with_account(Interval::Minutes15).await;
    let matched =
        insert_signal(&store, account.id, "BTCUSDT", Side::Short, Intent::Close, 30000.0).await;
    let unmatched =
        insert_signal(&store, account.id, "ETHUSDT", Side::Long, Intent::Close, 1800.0).await;

    let mut exchange = MockExchange::new();
    exchange
        .expect_open_positions()
        .times(1)
        .returning(|| Ok(vec![position("BTCUSDT", "-0.250")]));
    exchange
        .expect_submit_order()
        .times(1)
        .withf(|request| {
            request.symbol == "BTCUSDT"
                && request.side == OrderSide::Buy
                && request.order_type == OrderType::Market
                && request.quantity.as_deref() == Some("0.25")
        })
        .returning(|request| Ok(ack_for(request)));

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(FixedClientFactory(Arc::new(exchange))),
    )
    .await;
    engine.process_by_ids(&[matched.id, unmatched.id]).await;

    let matched_attempts = store
        .attempts_by_client_order_id(matched.client_order_id.as_str())
        .await
        .unwrap();
    assert_eq!(matched_attempts.len(), 1);
    assert_eq!(matched_attempts[0].status, AttemptStatus::Success);

    // No position to close means no submission and no attempt row.
    let unmatched_attempts = store
        .attempts_by_client_order_id(unmatched.client_order_id.as_str())
        .await
        .unwrap();
    assert!(unmatched_attempts.is_empty());
}

#[tokio::test]
async fn test_positions_failure_skips_closes_but_not_opens() {
    let (store, account) = store_with_account(Interval::Minutes15).await;
    let close =
        insert_signal(&store, account.id, "BTCUSDT", Side::Long, Intent::Close, 30000.0).await;
    let open =
        insert_signal(&store, account.id, "ETHUSDT", Side::Long, Intent::Open, 1800.0).await;

    let mut exchange = MockExchange::new();
    exchange
        .expect_open_positions()
        .times(1)
        .returning(|| Err(ExchangeError::HttpClient("connection reset".to_string())));
    exchange
        .expect_submit_order()
        .times(1)
        .withf(|request| request.symbol == "ETHUSDT" && request.order_type == OrderType::Limit)
        .returning(|request| Ok(ack_for(request)));

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(FixedClientFactory(Arc::new(exchange))),
    )
    .await;
    engine.process_by_ids(&[close.id, open.id]).await;

    let close_attempts = store
        .attempts_by_client_order_id(close.client_order_id.as_str())
        .await
        .unwrap();
    assert!(close_attempts.is_empty());

    let open_attempts = store
        .attempts_by_client_order_id(open.client_order_id.as_str())
        .await
        .unwrap();
    assert_eq!(open_attempts.len(), 1);
    assert_eq!(open_attempts[0].status, AttemptStatus::Success);
}

#[tokio::test]
async fn test_expired_and_unknown_symbol_signals_are_skipped_silently() {
    let (store, account) = store_with_account(Interval::Minutes15).await;
    let expired = store
        .insert_signal(NewSignal {
            account_id: account.id,
            symbol: "BTCUSDT".to_string(),
            side: Side::Long,
            intent: Intent::Open,
            price: 30000.0,
            event_time: Utc::now() - Duration::milliseconds(900_001),
        })
        .await
        .unwrap();
    let unknown =
        insert_signal(&store, account.id, "DOGEUSDT", Side::Long, Intent::Open, 0.1).await;

    let mut exchange = MockExchange::new();
    exchange.expect_submit_order().times(0);

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(FixedClientFactory(Arc::new(exchange))),
    )
    .await;
    engine.process_by_ids(&[expired.id, unknown.id]).await;

    for signal in [&expired, &unknown] {
        let attempts = store
            .attempts_by_client_order_id(signal.client_order_id.as_str())
            .await
            .unwrap();
        assert!(attempts.is_empty());
    }
}

#[tokio::test]
async fn test_client_factory_failure_isolates_account_groups() {
    let (store, good) = store_with_account(Interval::Minutes15).await;
    let bad = store
        .insert_account(NewAccount {
            name: "revoked".to_string(),
            api_key: String::new(),
            secret: String::new(),
            budget: 50.0,
            interval: Interval::Minutes15,
        })
        .await
        .unwrap();
    let good_signal =
        insert_signal(&store, good.id, "BTCUSDT", Side::Long, Intent::Open, 30000.0).await;
    let bad_signal =
        insert_signal(&store, bad.id, "BTCUSDT", Side::Long, Intent::Open, 30000.0).await;

    let mut exchange = MockExchange::new();
    exchange
        .expect_submit_order()
        .times(1)
        .returning(|request| Ok(ack_for(request)));

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(SelectiveClientFactory {
            client: Arc::new(exchange),
            refuse: "revoked".to_string(),
        }),
    )
    .await;
    engine.process_by_ids(&[good_signal.id, bad_signal.id]).await;

    let good_attempts = store
        .attempts_by_client_order_id(good_signal.client_order_id.as_str())
        .await
        .unwrap();
    assert_eq!(good_attempts.len(), 1);

    let bad_attempts = store
        .attempts_by_client_order_id(bad_signal.client_order_id.as_str())
        .await
        .unwrap();
    assert!(bad_attempts.is_empty());
}

#[tokio::test]
async fn test_success_attempt_stores_raw_exchange_response() {
    let (store, account) = store_with_account(Interval::Minutes15).await;
    let signal =
        insert_signal(&store, account.id, "BTCUSDT", Side::Long, Intent::Open, 30000.0).await;

    let mut exchange = MockExchange::new();
    exchange.expect_submit_order().times(1).returning(|request| {
        let mut ack = ack_for(request);
        ack.extra.insert(
            "executedQty".to_string(),
            serde_json::Value::String("0".to_string()),
        );
        Ok(ack)
    });

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(FixedClientFactory(Arc::new(exchange))),
    )
    .await;
    engine.process_by_ids(&[signal.id]).await;

    let attempts = store
        .attempts_by_client_order_id(signal.client_order_id.as_str())
        .await
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&attempts[0].response).unwrap();
    assert_eq!(stored["orderId"], 4021);
    assert_eq!(stored["clientOrderId"], signal.client_order_id.as_str());
    assert_eq!(stored["executedQty"], "0");
}

#[tokio::test]
async fn test_sweep_expired_deletes_only_stale_signals() {
    let (store, account) = store_with_account(Interval::Minutes15).await;
    let stale = store
        .insert_signal(NewSignal {
            account_id: account.id,
            symbol: "BTCUSDT".to_string(),
            side: Side::Long,
            intent: Intent::Open,
            price: 30000.0,
            event_time: Utc::now() - Duration::milliseconds(900_001),
        })
        .await
        .unwrap();
    let fresh =
        insert_signal(&store, account.id, "ETHUSDT", Side::Long, Intent::Open, 1800.0).await;

    let engine = engine_with(
        Arc::clone(&store),
        Arc::new(FixedClientFactory(Arc::new(MockExchange::new()))),
    )
    .await;
    let deleted = engine.sweep_expired().await.unwrap();
    assert_eq!(deleted, 1);

    let remaining = store.all_signals_with_accounts().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].1.id, fresh.id);
    assert_ne!(remaining[0].1.id, stale.id);
}
