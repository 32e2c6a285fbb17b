// Configuration options and normalization.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::rand::Source;

/// Requests per tuning round when none is configured.
pub const DEFAULT_WINDOW_N: i64 = 250_000;
/// EMA weight for per-key request rates.
pub const DEFAULT_ALPHA: f64 = 0.5;
/// Smallest admission-parameter candidate: 1 KiB.
pub const DEFAULT_GRID_MIN: i64 = 1 << 10;
/// Largest admission-parameter candidate: 64 MiB.
pub const DEFAULT_GRID_MAX: i64 = 64 << 20;
/// Number of log-spaced candidates between the grid bounds.
pub const DEFAULT_GRID_STEPS: usize = 32;
/// Admission parameter installed at construction: 256 KiB.
pub const INITIAL_C: f64 = (256 << 10) as f64;

/// Cache construction options.
///
/// All fields except `capacity_bytes` are optional in the sense that
/// out-of-range values are silently replaced by defaults (see
/// [`Options::normalized`]). The capacity is validated at construction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Total byte budget of the store. Required, must be positive.
    pub capacity_bytes: i64,
    /// Requests per tuning round.
    pub window_n: i64,
    /// EMA weight in (0, 1] for per-key request rates.
    pub alpha: f64,
    /// Lower bound of the candidate grid, in bytes.
    pub grid_min: i64,
    /// Upper bound of the candidate grid, in bytes.
    pub grid_max: i64,
    /// Number of log-spaced grid candidates.
    pub grid_steps: usize,
    /// Random source for admission coin flips. Defaults to a generator
    /// seeded from the OS entropy source; inject one for reproducibility.
    #[serde(skip)]
    pub rand: Option<Arc<dyn Source>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            capacity_bytes: 0,
            window_n: DEFAULT_WINDOW_N,
            alpha: DEFAULT_ALPHA,
            grid_min: DEFAULT_GRID_MIN,
            grid_max: DEFAULT_GRID_MAX,
            grid_steps: DEFAULT_GRID_STEPS,
            rand: None,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("capacity_bytes", &self.capacity_bytes)
            .field("window_n", &self.window_n)
            .field("alpha", &self.alpha)
            .field("grid_min", &self.grid_min)
            .field("grid_max", &self.grid_max)
            .field("grid_steps", &self.grid_steps)
            .field("rand", &self.rand.as_ref().map(|_| "injected"))
            .finish()
    }
}

impl Options {
    /// Returns a copy with every out-of-range field replaced by its default.
    ///
    /// The capacity is left untouched; the constructor rejects a
    /// non-positive one instead of guessing a budget.
    pub fn normalized(mut self) -> Self {
        if self.window_n <= 0 {
            self.window_n = DEFAULT_WINDOW_N;
        }
        if self.alpha <= 0.0 || self.alpha > 1.0 {
            self.alpha = DEFAULT_ALPHA;
        }
        if self.grid_min <= 0 {
            self.grid_min = DEFAULT_GRID_MIN;
        }
        if self.grid_max <= self.grid_min {
            self.grid_max = DEFAULT_GRID_MAX;
        }
        if self.grid_steps <= 1 {
            self.grid_steps = DEFAULT_GRID_STEPS;
        }
        self
    }
}
