//! Exchange step-size quantization.
//!
//! Binance rejects any order whose price or quantity is not an exact
//! multiple of the symbol's filter step, formatted at the step's precision.
//! Rounding happens in integer space so that steps finer than what `f64`
//! can represent exactly (e.g. `0.00000001`) introduce no drift.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places declared by a step's textual form.
///
/// `"0.001"` -> 3, `"0.10"` -> 2, `"1"` -> 0.
pub fn step_decimals(step: &str) -> u32 {
    step.split_once('.').map_or(0, |(_, frac)| frac.len() as u32)
}

/// Round `value` to the nearest multiple of `step` and format it with
/// exactly `step_decimals(step)` fraction digits.
///
/// Ties round half away from zero, matching the rounding the exchange
/// applies to its own filter examples. The result is plain decimal
/// notation; trailing zeros up to the step precision are preserved and
/// negative values keep their sign.
///
/// # Panics
///
/// Panics if `step` is not a positive decimal number or `value` is not
/// finite. Both are caller contract violations: steps come verbatim from
/// exchange metadata and values from stored signal fields.
pub fn quantize(value: f64, step: &str) -> String {
    let decimals = step_decimals(step);
    let step: Decimal = step.parse().expect("step must be a decimal number");
    assert!(step > Decimal::ZERO, "step must be positive");
    let value = Decimal::from_f64(value).expect("value must be finite");

    // Scale into integer space: 0.10 at 2 decimals becomes 10.
    let factor = Decimal::from(10u64.pow(decimals));
    let scaled_step = step * factor;

    let scaled_value =
        (value * factor).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let multiples = (scaled_value / scaled_step)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let mut adjusted = multiples * scaled_step / factor;
    if adjusted.is_zero() {
        // Avoid "-0.00" when a tiny negative value collapses to zero.
        adjusted = Decimal::ZERO;
    }

    format!("{adjusted:.prec$}", prec = decimals as usize)
}
