//! Signal validity window policy.
//!
//! A signal is actionable only while `reference - event <= window`. Once
//! expired it must not generate new order attempts; attempts already
//! recorded are kept for audit.

use chrono::{DateTime, Utc};

/// Whether a signal fired at `event_time` has outlived its validity window.
///
/// The boundary is exclusive: a signal whose age equals the window exactly
/// is still actionable.
pub fn is_expired(event_time: DateTime<Utc>, reference: DateTime<Utc>, window_ms: i64) -> bool {
    (reference - event_time).num_milliseconds() > window_ms
}
