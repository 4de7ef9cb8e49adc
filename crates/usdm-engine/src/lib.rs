//! Signal execution engine.
//!
//! Turns ingested trading signals into exchange orders:
//! - `classify` partitions a batch by intent
//! - the order builders turn one signal plus account context into a
//!   concrete order request, or decide to skip it
//! - `ExecutionEngine` fans submissions out concurrently with settle-all
//!   semantics and records every outcome through the attempt recorder
//!
//! Nothing in this crate is fatal to the process: the worst effect of any
//! failure is "signal not executed this cycle", auditable via absent or
//! failure attempt rows.

pub mod builders;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod recorder;

pub use builders::{build_close_order, build_open_order, build_take_profit_order};
pub use classifier::{classify, ClassifiedSignals};
pub use engine::{ClientFactory, ExecutionEngine};
pub use error::{EngineError, EngineResult};
pub use recorder::AttemptRecorder;
