//! Core domain types for the USDM signal execution bot.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `Account`, `Signal`, `OrderAttempt`: the persistent trading entities
//! - `Side`, `Intent`, `Interval`: the closed value sets signals carry
//! - `ClientOrderId`: per-signal idempotency key forwarded to the exchange
//! - `quantize`: exchange step-size quantization
//! - `is_expired`: signal validity window policy

pub mod decimal;
pub mod error;
pub mod expiry;
pub mod order;
pub mod types;

pub use decimal::{quantize, step_decimals};
pub use error::{CoreError, Result};
pub use expiry::is_expired;
pub use order::{ClientOrderId, OrderSide, OrderType, TimeInForce};
pub use types::{
    Account, AttemptOutcome, AttemptStatus, GlobalSettings, Intent, Interval, OrderAttempt,
    Signal, Side,
};
