// Cache builders for end-to-end tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::config::Options;
use crate::db::Cache;
use crate::rand::{Pcg, Source};

/// Builds a cache with a deterministic RNG and a window large enough to
/// keep the background tuner parked for the whole test.
pub fn deterministic_cache(capacity: i64) -> Arc<Cache> {
    let opts = Options {
        capacity_bytes: capacity,
        window_n: 1_000_000,
        alpha: 0.5,
        grid_min: 1 << 10,
        grid_max: 64 << 20,
        grid_steps: 16,
        rand: Some(seeded_source(1)),
    };
    Cache::new(opts).expect("cache construction")
}

/// Builds a cache from explicit options with a deterministic RNG.
pub fn deterministic_cache_with(mut opts: Options, seed: u64) -> Arc<Cache> {
    opts.rand = Some(seeded_source(seed));
    Cache::new(opts).expect("cache construction")
}

/// Deterministic random source for a given seed.
pub fn seeded_source(seed: u64) -> Arc<dyn Source> {
    Arc::new(Pcg::seeded(seed, 0))
}

/// Random source wrapper counting how often it is consulted.
pub struct CountingSource {
    inner: Pcg,
    draws: AtomicI64,
}

impl CountingSource {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg::seeded(seed, 0),
            draws: AtomicI64::new(0),
        }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> i64 {
        self.draws.load(Ordering::Relaxed)
    }
}

impl Source for CountingSource {
    fn float64(&self) -> f64 {
        self.draws.fetch_add(1, Ordering::Relaxed);
        self.inner.float64()
    }
}

/// Deterministic key for index `i`.
pub fn key(prefix: &str, i: usize) -> String {
    format!("{}-{:05}", prefix, i)
}
