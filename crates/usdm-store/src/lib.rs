//! SQLite persistence for accounts, signals, and order attempts.
//!
//! The store owns the relational side of the system: account and signal
//! CRUD, the append-only order-attempt audit trail, and the single-row
//! global settings record. The execution engine treats it as a plain
//! query surface; nothing here makes trading decisions.

pub mod accounts;
pub mod attempts;
pub mod db;
pub mod error;
pub mod settings;
pub mod signals;

pub use accounts::NewAccount;
pub use db::SqliteStore;
pub use error::{StoreError, StoreResult};
pub use signals::{NewSignal, SignalListing};
