//! Field conventions the analyzer reads from event payloads.
//!
//! Only explicit keys are consulted. A missing key means "unknown", never
//! zero, and there is no structural inference over arbitrary payloads.

use argus_types::{Event, Value};

/// Output keys that carry the size of a collection-valued result, in
/// lookup order.
pub const DEFAULT_COUNT_KEYS: [&str; 2] = ["results_count", "count"];

/// Key holding the attempt number of a retry (metadata first, then input).
pub const RETRY_COUNT_KEY: &str = "retry_count";

/// Per-event override of the configured retry ceiling (metadata).
pub const MAX_RETRIES_KEY: &str = "max_retries";

/// Non-negative integral view of a value.
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Int(n) => u64::try_from(*n).ok(),
        Value::Float(x) if *x >= 0.0 && x.fract() == 0.0 && x.is_finite() => Some(*x as u64),
        _ => None,
    }
}

/// Collection size reported in the event's output, with the key it came
/// from.
pub fn output_count<'k, S: AsRef<str>>(event: &Event, keys: &'k [S]) -> Option<(&'k str, u64)> {
    keys.iter().find_map(|key| {
        let key = key.as_ref();
        event.output_value(key).and_then(as_count).map(|n| (key, n))
    })
}

pub fn retry_count(event: &Event) -> Option<u64> {
    event
        .metadata_value(RETRY_COUNT_KEY)
        .or_else(|| event.input_value(RETRY_COUNT_KEY))
        .and_then(as_count)
}

pub fn max_retries(event: &Event) -> Option<u64> {
    event.metadata_value(MAX_RETRIES_KEY).and_then(as_count)
}
