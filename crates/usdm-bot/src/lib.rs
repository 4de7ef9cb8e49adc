//! Signal execution bot for Binance USDM futures.
//!
//! CLI surface over the execution engine: process signal batches, sweep
//! expired signals, refresh trading rules, and list signals with their
//! recorded attempts.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::BotConfig;
pub use error::{AppError, AppResult};
pub use logging::init_logging;
