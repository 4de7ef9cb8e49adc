//! Order builders: one per intent.
//!
//! Each builder turns a classified signal plus account-derived context
//! into a concrete order request, or returns `None` to skip the signal.
//! A skip means no submission and therefore no attempt row. All builders
//! forward the signal's client order id verbatim, so a retried signal
//! cannot create a second live order on the exchange.

use chrono::{DateTime, Utc};
use tracing::debug;
use usdm_core::{is_expired, quantize, Interval, OrderType, Signal, TimeInForce};
use usdm_exchange::{OrderRequest, Position};
use usdm_registry::RuleSnapshot;

/// Entry order for an open signal.
///
/// Skipped when the signal has outlived its validity window or the
/// symbol has no tradable rule. The GTD deadline mirrors the expiry
/// window so the exchange cancels the order on its own even if local
/// expiry checks were bypassed.
pub fn build_open_order(
    signal: &Signal,
    budget: f64,
    interval: Interval,
    rules: &RuleSnapshot,
    now: DateTime<Utc>,
) -> Option<OrderRequest> {
    if is_expired(signal.event_time, now, interval.window_ms()) {
        debug!(signal_id = signal.id, symbol = %signal.symbol, "Skipping expired open signal");
        return None;
    }
    let Some(rule) = rules.rule(&signal.symbol) else {
        debug!(signal_id = signal.id, symbol = %signal.symbol, "No tradable rule for symbol");
        return None;
    };

    Some(OrderRequest {
        symbol: signal.symbol.clone(),
        side: signal.side.entry(),
        order_type: OrderType::Limit,
        quantity: Some(quantize(budget / signal.price, &rule.quantity_step)),
        price: Some(quantize(signal.price, &rule.price_step)),
        stop_price: None,
        time_in_force: Some(TimeInForce::GoodTilDate),
        good_till_date: Some(signal.event_time.timestamp_millis() + interval.window_ms()),
        close_position: false,
        client_order_id: signal.client_order_id.clone(),
    })
}

/// Market order that closes the live position matching the signal.
///
/// Positions are fetched once per batch by the caller. Skipped when no
/// position matches the signal's symbol and side. Short exposure reports
/// a negative quantity; the sign is stripped, never treated as zero.
pub fn build_close_order(signal: &Signal, positions: &[Position]) -> Option<OrderRequest> {
    let position = positions
        .iter()
        .find(|p| p.symbol == signal.symbol && p.side() == Some(signal.side));
    let Some(position) = position else {
        debug!(
            signal_id = signal.id,
            symbol = %signal.symbol,
            side = %signal.side,
            "No open position to close"
        );
        return None;
    };

    Some(OrderRequest {
        symbol: signal.symbol.clone(),
        side: signal.side.exit(),
        order_type: OrderType::Market,
        quantity: Some(position.size().normalize().to_string()),
        price: None,
        stop_price: None,
        time_in_force: None,
        good_till_date: None,
        close_position: false,
        client_order_id: signal.client_order_id.clone(),
    })
}

/// Take-profit order that fully closes the position when its stop price
/// trades.
///
/// Same expiry and rule gating as the open builder; no quantity is sent
/// because `closePosition` asks the exchange to flatten whatever is held.
pub fn build_take_profit_order(
    signal: &Signal,
    interval: Interval,
    rules: &RuleSnapshot,
    now: DateTime<Utc>,
) -> Option<OrderRequest> {
    if is_expired(signal.event_time, now, interval.window_ms()) {
        debug!(signal_id = signal.id, symbol = %signal.symbol, "Skipping expired take-profit signal");
        return None;
    }
    let Some(rule) = rules.rule(&signal.symbol) else {
        debug!(signal_id = signal.id, symbol = %signal.symbol, "No tradable rule for symbol");
        return None;
    };

    Some(OrderRequest {
        symbol: signal.symbol.clone(),
        side: signal.side.exit(),
        order_type: OrderType::TakeProfitMarket,
        quantity: None,
        price: None,
        stop_price: Some(quantize(signal.price, &rule.price_step)),
        time_in_force: None,
        good_till_date: Some(signal.event_time.timestamp_millis() + interval.window_ms()),
        close_position: true,
        client_order_id: signal.client_order_id.clone(),
    })
}
