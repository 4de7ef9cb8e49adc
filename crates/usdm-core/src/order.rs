//! Order-related types and identifiers.
//!
//! Provides the order side, type, and time-in-force values understood by
//! the Binance USDM futures order endpoint, plus the client order ID used
//! as the per-signal idempotency key.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Exchange-facing order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Wire representation (`BUY` / `SELL`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Limit order with an explicit price.
    Limit,
    /// Market order (used when closing a live position).
    Market,
    /// Stop-market order triggered at `stopPrice`, used for take-profits.
    TakeProfitMarket,
}

impl OrderType {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::TakeProfitMarket => "TAKE_PROFIT_MARKET",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    #[serde(rename = "GTC")]
    GoodTilCancelled,
    /// Good-til-date: the exchange auto-cancels at `goodTillDate`. Primary
    /// TIF for signal-driven entries so stale orders die on their own.
    #[default]
    #[serde(rename = "GTD")]
    GoodTilDate,
    /// Immediate-or-cancel.
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
}

impl TimeInForce {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoodTilCancelled => "GTC",
            Self::GoodTilDate => "GTD",
            Self::ImmediateOrCancel => "IOC",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client order ID for idempotency.
///
/// Generated once when a signal is ingested and reused verbatim for every
/// order attempt tied to that signal. Retrying a failed signal therefore
/// cannot create two live orders: the exchange rejects a duplicate ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `sig_{timestamp_ms}_{uuid_short}`
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("sig_{ts}_{uuid_short}"))
    }

    /// Create from an existing string (for rows read back from storage).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientOrderId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for ClientOrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
