//! Counters for cache and tuning statistics.
//

use std::sync::atomic::AtomicI64;

/// Cumulative counters shared between the data plane and the tuner.
pub struct Counters {
    pub hits: AtomicI64,
    pub misses: AtomicI64,
    pub admitted: AtomicI64,
    pub denied: AtomicI64,
    pub evicted_items: AtomicI64,
    pub evicted_bytes: AtomicI64,
    pub tune_passes: AtomicI64,
}

impl Counters {
    /// Creates a new counters instance.
    pub fn new() -> Self {
        Self {
            hits: AtomicI64::new(0),
            misses: AtomicI64::new(0),
            admitted: AtomicI64::new(0),
            denied: AtomicI64::new(0),
            evicted_items: AtomicI64::new(0),
            evicted_bytes: AtomicI64::new(0),
            tune_passes: AtomicI64::new(0),
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
