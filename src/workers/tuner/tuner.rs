//! Background tuner for the admission parameter.
//
// Consumes window snapshots, maintains per-key EMA request rates, grid
// searches candidate parameters and installs the one with the highest
// modeled object hit ratio. Runs on its own thread; an explicit synchronous
// pass uses the same procedure on the caller's thread.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::debug;

use crate::config::Options;
use crate::db::admission::CSlot;
use crate::db::stats::{Observation, Window};

use super::counters::Counters;
use super::solver::{candidate_grid, pin_closed_form, solve_mu, RateItem};
use super::telemetry;

/// Admission-parameter tuner.
pub struct Tuner {
    capacity: i64,
    alpha: f64,
    grid_min: i64,
    grid_max: i64,
    grid_steps: usize,
    c: Arc<CSlot>,
    window: Arc<Window>,
    prev_r: Mutex<HashMap<Arc<str>, f64>>,
    counters: Arc<Counters>,
}

impl Tuner {
    /// Creates a tuner over the given window and parameter slot.
    pub fn new(
        opts: &Options,
        c: Arc<CSlot>,
        window: Arc<Window>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            capacity: opts.capacity_bytes,
            alpha: opts.alpha,
            grid_min: opts.grid_min,
            grid_max: opts.grid_max,
            grid_steps: opts.grid_steps,
            c,
            window,
            prev_r: Mutex::new(HashMap::new()),
            counters,
        }
    }

    /// Runs the worker loop until stopped.
    ///
    /// Blocks only on the wake channel. A stop request is observed on the
    /// next wake (the closer posts a best-effort one) or when the channel
    /// disconnects.
    pub fn run(&self, wake: Receiver<()>, stop: Arc<AtomicBool>) {
        debug!(component = "tuner", "worker started");
        while wake.recv().is_ok() {
            if stop.load(Ordering::Acquire) {
                break;
            }
            self.tune_once();
        }
        debug!(component = "tuner", "worker stopped");
    }

    /// Runs one tuning pass synchronously.
    ///
    /// Snapshots the window, folds the observations into the EMA rates,
    /// grid-searches the candidate parameter and installs the winner. Safe
    /// to call concurrently with the data plane and with the worker; an
    /// empty or unusable window leaves the parameter untouched.
    pub fn tune_once(&self) {
        let snap = self.window.snapshot();
        if snap.is_empty() {
            return;
        }

        let c_before = self.c.load();
        let (items, total_req) = self.build_rates(&snap);
        if items.is_empty() || total_req == 0.0 {
            return;
        }

        let best = match self.search_best_c(&items, total_req) {
            Some(best) => best,
            None => return,
        };
        if best.is_finite() && best > 0.0 {
            self.c.store(best);
        }

        self.counters.tune_passes.fetch_add(1, Ordering::Relaxed);
        telemetry::log_pass(c_before, self.c.load(), items.len(), total_req, &self.counters);
    }

    /// Folds a snapshot into the per-key EMA rates.
    ///
    /// Keys without a known size contributed requests but cannot be
    /// modeled, so they are skipped. Returns the modeled items and the sum
    /// of their rates.
    fn build_rates(
        &self,
        snap: &HashMap<Arc<str>, Observation>,
    ) -> (Vec<RateItem>, f64) {
        let mut prev_r = self.prev_r.lock();
        let mut items = Vec::with_capacity(snap.len());
        let mut total = 0.0;
        for (key, o) in snap {
            if o.size <= 0 {
                continue;
            }
            let prev = prev_r.get(key).copied().unwrap_or(0.0);
            let rate = self.alpha * o.cnt as f64 + (1.0 - self.alpha) * prev;
            prev_r.insert(key.clone(), rate);
            items.push(RateItem { s: o.size, r: rate });
            total += rate;
        }
        (items, total)
    }

    /// Grid-searches the candidate with the best modeled OHR.
    ///
    /// Candidates whose capacity constraint cannot be solved are skipped;
    /// the grid is scanned in ascending order and ties keep the first
    /// winner. Returns None when no candidate is usable.
    fn search_best_c(&self, items: &[RateItem], total_req: f64) -> Option<f64> {
        let mut best_ohr = -1.0;
        let mut best_c = None;

        for cand in candidate_grid(self.grid_min, self.grid_max, self.grid_steps) {
            let mu = match solve_mu(items, cand, self.capacity) {
                Some(mu) => mu,
                None => continue,
            };

            let mut hits = 0.0;
            for it in items {
                hits += it.r * pin_closed_form(it.r, mu, it.s as f64, cand);
            }
            let ohr = hits / total_req;
            if ohr.is_finite() && ohr > best_ohr {
                best_ohr = ohr;
                best_c = Some(cand);
            }
        }

        best_c
    }

    /// Exposes the smoothed request rate for a key (for diagnostics).
    #[allow(dead_code)]
    pub fn rate(&self, key: &str) -> Option<f64> {
        self.prev_r.lock().get(key).copied()
    }
}
