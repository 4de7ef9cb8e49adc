//! Intent classification.

use usdm_core::{Intent, Signal};

/// A signal batch partitioned by intent, each bucket in input order.
#[derive(Debug, Default)]
pub struct ClassifiedSignals {
    pub open: Vec<Signal>,
    pub close: Vec<Signal>,
    pub take_profit: Vec<Signal>,
}

/// Partition `signals` by intent. Pure; no filtering beyond the split.
pub fn classify(signals: Vec<Signal>) -> ClassifiedSignals {
    let mut classified = ClassifiedSignals::default();
    for signal in signals {
        match signal.intent {
            Intent::Open => classified.open.push(signal),
            Intent::Close => classified.close.push(signal),
            Intent::TakeProfit => classified.take_profit.push(signal),
        }
    }
    classified
}
