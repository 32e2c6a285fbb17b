//! Probabilistic size-based admission control.
//

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::rand::Source;

/// Lock-free slot holding the admission parameter as raw IEEE-754 bits.
///
/// The gate reads it on every candidate miss and the tuner stores it after
/// a pass; neither side takes a lock. Updates become visible to subsequent
/// admission decisions without any further ordering.
pub struct CSlot {
    bits: AtomicU64,
}

impl CSlot {
    /// Creates a slot holding the given parameter.
    pub fn new(v: f64) -> Self {
        Self {
            bits: AtomicU64::new(v.to_bits()),
        }
    }

    /// Reads the current parameter.
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Installs a new parameter.
    pub fn store(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }
}

/// Admission gate deciding whether a candidate object enters the store.
pub struct Gate {
    capacity: i64,
    c: Arc<CSlot>,
    rand: Arc<dyn Source>,
}

impl Gate {
    /// Creates a new admission gate.
    pub fn new(capacity: i64, c: Arc<CSlot>, rand: Arc<dyn Source>) -> Self {
        Self { capacity, c, rand }
    }

    /// Returns true when an object of `size` bytes should be admitted.
    ///
    /// Admission probability is exp(-size/c): certain for empty values and
    /// strictly decreasing in size. Objects larger than the whole capacity
    /// are denied without a coin flip.
    pub fn admit(&self, size: i64) -> bool {
        if size > self.capacity {
            return false;
        }
        let c = self.c.load();
        self.rand.float64() < (-(size as f64) / c).exp()
    }
}
