//! Per-window request statistics feeding the tuner.
//

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::mpsc::SyncSender;
use std::sync::Arc;

/// Per-key observation within the current window.
#[derive(Clone, Copy, Default)]
pub struct Observation {
    /// Last non-zero observed size in bytes; zero means unknown.
    pub size: i64,
    /// Requests seen for the key in this window.
    pub cnt: i64,
}

struct WindowData {
    obs: HashMap<Arc<str>, Observation>,
    win_reqs: i64,
}

/// Sliding request window.
///
/// Every request, hit or miss, is recorded here. When the window fills, a
/// non-blocking wake is posted to the tuner; the channel holds at most one
/// pending wake, so bursts of completed windows coalesce. The window lock
/// is released before signalling and is never held together with the store
/// lock.
pub struct Window {
    window_n: i64,
    data: Mutex<WindowData>,
    wake: SyncSender<()>,
}

impl Window {
    /// Creates an empty window posting wakes into `wake`.
    pub fn new(window_n: i64, wake: SyncSender<()>) -> Self {
        Self {
            window_n,
            data: Mutex::new(WindowData {
                obs: HashMap::new(),
                win_reqs: 0,
            }),
            wake,
        }
    }

    /// Records one request for `key`.
    ///
    /// A non-zero `size` refreshes the observed size; zero leaves any
    /// earlier size in place so a miss never erases what a hit learned.
    pub fn record(&self, key: &str, size: i64) {
        let need = {
            let mut data = self.data.lock();
            match data.obs.get_mut(key) {
                Some(o) => {
                    if size > 0 {
                        o.size = size;
                    }
                    o.cnt += 1;
                }
                None => {
                    data.obs.insert(Arc::from(key), Observation { size, cnt: 1 });
                }
            }
            data.win_reqs += 1;
            data.win_reqs >= self.window_n
        };

        if need {
            // Dropped when a wake is already pending.
            let _ = self.wake.try_send(());
        }
    }

    /// Moves the window content out, leaving an empty window behind.
    pub fn snapshot(&self) -> HashMap<Arc<str>, Observation> {
        let mut data = self.data.lock();
        data.win_reqs = 0;
        std::mem::take(&mut data.obs)
    }
}
