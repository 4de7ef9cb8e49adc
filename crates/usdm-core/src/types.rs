//! Persistent trading entities and their closed value sets.

use crate::error::CoreError;
use crate::order::{ClientOrderId, OrderSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position side carried by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Order side that opens exposure in this direction.
    pub fn entry(&self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Buy,
            Self::Short => OrderSide::Sell,
        }
    }

    /// Order side that closes exposure in this direction.
    pub fn exit(&self) -> OrderSide {
        self.entry().opposite()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            other => Err(CoreError::InvalidSide(other.to_string())),
        }
    }
}

/// Three-way signal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Open a new position.
    Open,
    /// Close the live position for the signal's symbol/side.
    Close,
    /// Arm a take-profit that fully closes the position when hit.
    TakeProfit,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Close => write!(f, "close"),
            Self::TakeProfit => write!(f, "take_profit"),
        }
    }
}

impl FromStr for Intent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            "take_profit" => Ok(Self::TakeProfit),
            other => Err(CoreError::InvalidIntent(other.to_string())),
        }
    }
}

/// Trading interval configured per account.
///
/// Defines both the signal validity window and the auto-cancel deadline
/// attached to entry orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "15m")]
    Minutes15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
}

impl Interval {
    /// Validity window in milliseconds.
    pub fn window_ms(&self) -> i64 {
        match self {
            Self::Minutes15 => 900_000,
            Self::Hour1 => 3_600_000,
            Self::Day1 => 86_400_000,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes15 => write!(f, "15m"),
            Self::Hour1 => write!(f, "1h"),
            Self::Day1 => write!(f, "1d"),
        }
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15m" => Ok(Self::Minutes15),
            "1h" => Ok(Self::Hour1),
            "1d" => Ok(Self::Day1),
            other => Err(CoreError::InvalidInterval(other.to_string())),
        }
    }
}

/// Independently-keyed trading account.
///
/// Read-only to the engine; ownership lives with the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    /// Unique display name.
    pub name: String,
    pub api_key: String,
    pub secret: String,
    /// Monetary units allocated per open order.
    pub budget: f64,
    pub interval: Interval,
}

/// Trading instruction addressed to one account.
///
/// Immutable after creation; expired signals are deleted downstream but
/// never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,
    pub account_id: i64,
    /// Idempotency key, generated once at ingestion and reused for every
    /// order attempt tied to this signal.
    pub client_order_id: ClientOrderId,
    pub symbol: String,
    pub side: Side,
    pub intent: Intent,
    pub price: f64,
    /// When the signal fired.
    pub event_time: DateTime<Utc>,
    /// When the signal was received.
    pub created_at: DateTime<Utc>,
}

/// Outcome status of one order attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Failure,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

impl FromStr for AttemptStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(CoreError::InvalidAttemptStatus(other.to_string())),
        }
    }
}

/// Outcome of a single order submission, before it is persisted.
///
/// Success carries the raw exchange response; failure carries the
/// serialized error. Explicit variants, never an either-shaped blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    Failure(String),
}

impl AttemptOutcome {
    pub fn status(&self) -> AttemptStatus {
        match self {
            Self::Success(_) => AttemptStatus::Success,
            Self::Failure(_) => AttemptStatus::Failure,
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Self::Success(raw) | Self::Failure(raw) => raw,
        }
    }
}

/// Append-only audit record of one submission outcome for a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAttempt {
    pub id: i64,
    pub signal_id: i64,
    /// Denormalized from the signal for join convenience; the sole
    /// correlation mechanism between a submission and its outcome.
    pub client_order_id: ClientOrderId,
    pub status: AttemptStatus,
    /// Raw exchange response (success) or serialized error (failure).
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Mutable process-wide settings affecting exchange client construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Binance `recvWindow` for signed calls, in milliseconds.
    pub recv_window: u64,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self { recv_window: 10_000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_entry_exit() {
        assert_eq!(Side::Long.entry(), OrderSide::Buy);
        assert_eq!(Side::Long.exit(), OrderSide::Sell);
        assert_eq!(Side::Short.entry(), OrderSide::Sell);
        assert_eq!(Side::Short.exit(), OrderSide::Buy);
    }

    #[test]
    fn test_interval_windows() {
        assert_eq!(Interval::Minutes15.window_ms(), 900_000);
        assert_eq!(Interval::Hour1.window_ms(), 3_600_000);
        assert_eq!(Interval::Day1.window_ms(), 86_400_000);
    }

    #[test]
    fn test_interval_round_trip() {
        for s in ["15m", "1h", "1d"] {
            assert_eq!(s.parse::<Interval>().unwrap().to_string(), s);
        }
        assert!("4h".parse::<Interval>().is_err());
    }

    #[test]
    fn test_intent_round_trip() {
        for s in ["open", "close", "take_profit"] {
            assert_eq!(s.parse::<Intent>().unwrap().to_string(), s);
        }
        assert!("hold".parse::<Intent>().is_err());
    }

    #[test]
    fn test_attempt_outcome_status() {
        assert_eq!(
            AttemptOutcome::Success("{}".into()).status(),
            AttemptStatus::Success
        );
        assert_eq!(
            AttemptOutcome::Failure("boom".into()).status(),
            AttemptStatus::Failure
        );
    }
}
