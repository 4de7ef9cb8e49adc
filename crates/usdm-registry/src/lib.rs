//! Symbol trading-rule cache.
//!
//! Caches the per-symbol price and quantity steps from exchange info,
//! populated lazily and refreshed only on explicit request. Refreshes
//! replace the whole snapshot atomically so concurrent readers never see
//! a partially built rule map.

pub mod error;
pub mod rules;

pub use error::{RegistryError, RegistryResult};
pub use rules::{RuleSnapshot, SymbolRule, SymbolRuleCache};
