// Cache facade with admission control and background tuning.

use anyhow::{bail, Result};
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::debug;

use crate::config::{Options, INITIAL_C};
use crate::db::admission::{CSlot, Gate};
use crate::db::stats::Window;
use crate::db::storage::Store;
use crate::model::Entry;
use crate::rand::{Pcg, Source};
use crate::workers::tuner::counters::Counters;
use crate::workers::Tuner;

/// Snapshot of the cumulative cache counters and current usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub hits: i64,
    pub misses: i64,
    pub admitted: i64,
    pub denied: i64,
    pub evicted_items: i64,
    pub evicted_bytes: i64,
    /// Entries currently cached.
    pub entries: i64,
    /// Bytes currently used by cached values.
    pub used_bytes: i64,
}

/// Self-tuning size-aware in-memory cache.
///
/// Values are admitted with probability exp(-size/c) and evicted by LRU
/// under a fixed byte budget. Every request is recorded in a statistics
/// window; a dedicated worker re-optimizes `c` from the window whenever it
/// fills, so the admission policy follows the workload it observes.
pub struct Cache {
    capacity: i64,
    store: Store,
    window: Arc<Window>,
    gate: Gate,
    c: Arc<CSlot>,
    tuner: Arc<Tuner>,
    counters: Arc<Counters>,
    wake_tx: SyncSender<()>,
    stop: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Cache {
    /// Constructs the cache and starts the tuner worker.
    ///
    /// Out-of-range options fall back to defaults; a non-positive capacity
    /// is an error.
    pub fn new(opts: Options) -> Result<Arc<Self>> {
        let opts = opts.normalized();
        if opts.capacity_bytes <= 0 {
            bail!("capacity_bytes must be positive, got {}", opts.capacity_bytes);
        }

        let rand: Arc<dyn Source> = match opts.rand.clone() {
            Some(r) => r,
            None => Arc::new(Pcg::new()),
        };

        let c = Arc::new(CSlot::new(INITIAL_C));
        let (wake_tx, wake_rx) = mpsc::sync_channel(1);
        let window = Arc::new(Window::new(opts.window_n, wake_tx.clone()));
        let counters = Arc::new(Counters::new());
        let tuner = Arc::new(Tuner::new(&opts, c.clone(), window.clone(), counters.clone()));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = {
            let tuner = tuner.clone();
            let stop = stop.clone();
            std::thread::Builder::new()
                .name("adaptcache-tuner".to_string())
                .spawn(move || tuner.run(wake_rx, stop))?
        };

        Ok(Arc::new(Self {
            capacity: opts.capacity_bytes,
            store: Store::new(opts.capacity_bytes),
            gate: Gate::new(opts.capacity_bytes, c.clone(), rand),
            window,
            c,
            tuner,
            counters,
            wake_tx,
            stop,
            worker: Mutex::new(Some(worker)),
        }))
    }

    /// Looks up a key, touching its recency and recording the request.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        match self.store.get(key) {
            Some(entry) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                let size = entry.size();
                let val = entry.value();
                self.window.record(key, size);
                Some(val)
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.window.record(key, 0);
                None
            }
        }
    }

    /// Inserts or updates a value.
    ///
    /// Admission is probabilistic in the value size; a denied or oversize
    /// candidate leaves the store untouched, including any value the key
    /// already holds. The request is recorded either way.
    pub fn set(&self, key: &str, value: impl Into<Bytes>) {
        let value = value.into();
        let size = value.len() as i64;

        if size > self.capacity {
            self.counters.denied.fetch_add(1, Ordering::Relaxed);
            self.window.record(key, size);
            return;
        }
        if !self.gate.admit(size) {
            self.counters.denied.fetch_add(1, Ordering::Relaxed);
            self.window.record(key, size);
            return;
        }
        self.counters.admitted.fetch_add(1, Ordering::Relaxed);

        let (evicted_items, evicted_bytes) = self.store.set(Entry::new(key, value));
        if evicted_items > 0 {
            self.counters
                .evicted_items
                .fetch_add(evicted_items, Ordering::Relaxed);
            self.counters
                .evicted_bytes
                .fetch_add(evicted_bytes, Ordering::Relaxed);
        }
        self.window.record(key, size);
    }

    /// Removes a key. Returns true when it was present.
    pub fn remove(&self, key: &str) -> bool {
        let (_, hit) = self.store.remove(key);
        hit
    }

    /// Drops all entries.
    pub fn clear(&self) {
        let (freed_bytes, items) = self.store.clear();
        debug!(
            component = "cache",
            freed = %crate::bytes::fmt_mem(freed_bytes),
            items,
            "cleared"
        );
    }

    /// Number of cached entries.
    pub fn len(&self) -> i64 {
        self.store.len()
    }

    /// Returns true when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Bytes currently used by stored values.
    pub fn used_bytes(&self) -> i64 {
        self.store.mem()
    }

    /// Current admission parameter in bytes.
    pub fn parameter_c(&self) -> f64 {
        self.c.load()
    }

    /// Runs one tuning pass on the caller's thread.
    pub fn tune_once(&self) {
        self.tuner.tune_once();
    }

    /// Returns a snapshot of the cumulative counters and current usage.
    pub fn stats(&self) -> Stats {
        let (used_bytes, entries) = self.store.stat();
        Stats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            admitted: self.counters.admitted.load(Ordering::Relaxed),
            denied: self.counters.denied.load(Ordering::Relaxed),
            evicted_items: self.counters.evicted_items.load(Ordering::Relaxed),
            evicted_bytes: self.counters.evicted_bytes.load(Ordering::Relaxed),
            entries,
            used_bytes,
        }
    }

    /// Stops the tuner worker.
    ///
    /// Idempotent: the join handle is taken exactly once. Data-plane
    /// operations remain usable afterwards; their wakes are dropped.
    pub fn close(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            self.stop.store(true, Ordering::Release);
            // Nudge a parked worker; when a wake is already pending the
            // worker observes the stop flag on that wake instead.
            let _ = self.wake_tx.try_send(());
            let _ = handle.join();
            debug!(component = "cache", "tuner worker joined");
        }
    }

    #[cfg(test)]
    pub(crate) fn set_parameter_c(&self, v: f64) {
        self.c.store(v);
    }

    #[cfg(test)]
    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    #[cfg(test)]
    pub(crate) fn tuner(&self) -> &Tuner {
        &self.tuner
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        // Ensure the worker receives a stop signal on shutdown.
        self.close();
    }
}
