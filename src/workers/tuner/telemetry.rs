// Telemetry for tuning passes.

use std::sync::atomic::Ordering;

use crate::bytes;

use super::counters::Counters;

/// Logs the outcome of one tuning pass and the cumulative cache counters.
pub fn log_pass(
    c_before: f64,
    c_after: f64,
    modeled_keys: usize,
    total_req: f64,
    counters: &Counters,
) {
    tracing::info!(
        component = "tuner",
        c_before = %bytes::fmt_mem(c_before as i64),
        c_after = %bytes::fmt_mem(c_after as i64),
        modeled_keys,
        total_req,
        hits = counters.hits.load(Ordering::Relaxed),
        misses = counters.misses.load(Ordering::Relaxed),
        admitted = counters.admitted.load(Ordering::Relaxed),
        denied = counters.denied.load(Ordering::Relaxed),
        evicted_items = counters.evicted_items.load(Ordering::Relaxed),
        evicted_bytes = counters.evicted_bytes.load(Ordering::Relaxed),
        "tuning pass"
    );
}
