//! Byte-bounded LRU store.
//

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::model::Entry;

use super::lru::LRUList;

/// Store data protected by the exclusive lock.
struct StoreData {
    items: HashMap<Arc<str>, Entry>,
    lru: LRUList,
}

/// In-memory store bounded by a byte budget with strict LRU eviction.
///
/// A single exclusive lock protects the key map and the recency list
/// together, so an entry is always present in both or in neither. The byte
/// and entry counters are atomics: stats reads never take the lock, and
/// mutations adjust them while holding it.
pub struct Store {
    capacity: i64,
    data: Mutex<StoreData>,
    mem: AtomicI64,
    len: AtomicI64,
}

impl Store {
    /// Creates an empty store with the given byte capacity.
    pub fn new(capacity: i64) -> Self {
        // Pre-allocate to reduce early rehashing under churn.
        const INITIAL_CAPACITY: usize = 256;
        Self {
            capacity,
            data: Mutex::new(StoreData {
                items: HashMap::with_capacity(INITIAL_CAPACITY),
                lru: LRUList::new(),
            }),
            mem: AtomicI64::new(0),
            len: AtomicI64::new(0),
        }
    }

    /// Looks up a key, touching its recency on hit.
    pub fn get(&self, key: &str) -> Option<Entry> {
        let mut guard = self.data.lock();
        let data = &mut *guard;
        if let Some(entry) = data.items.get(key) {
            let entry = entry.clone();
            data.lru.move_to_front(entry.key());
            return Some(entry);
        }
        None
    }

    /// Inserts or updates an entry, evicting from the tail until the byte
    /// budget holds. Returns (evicted_items, evicted_bytes).
    ///
    /// The caller guarantees the entry fits the budget on its own
    /// (`size <= capacity`); the eviction loop still guards an empty list.
    pub fn set(&self, entry: Entry) -> (i64, i64) {
        let size = entry.size();
        let key = entry.key().clone();
        let mut guard = self.data.lock();
        let data = &mut *guard;

        let mut evicted_items = 0i64;
        let mut evicted_bytes = 0i64;

        if data.items.contains_key(&*key) {
            // Update in place: adjust the budget by the size delta, then
            // evict others while the budget is exceeded. The updated entry
            // sits at the front and is only its own victim when alone, in
            // which case the budget already holds.
            let old_size = data.items.insert(key.clone(), entry).map_or(0, |e| e.size());
            data.lru.move_to_front(&key);
            self.mem.fetch_add(size - old_size, Ordering::Relaxed);

            while self.mem.load(Ordering::Relaxed) > self.capacity {
                match self.evict_one(data) {
                    Some(freed) => {
                        evicted_items += 1;
                        evicted_bytes += freed;
                    }
                    None => break,
                }
            }
        } else {
            while self.mem.load(Ordering::Relaxed) + size > self.capacity {
                match self.evict_one(data) {
                    Some(freed) => {
                        evicted_items += 1;
                        evicted_bytes += freed;
                    }
                    None => break,
                }
            }

            data.items.insert(key.clone(), entry);
            data.lru.push_front(key);
            self.mem.fetch_add(size, Ordering::Relaxed);
            self.len.fetch_add(1, Ordering::Relaxed);
        }

        (evicted_items, evicted_bytes)
    }

    /// Removes a key and returns (freed_bytes, hit).
    pub fn remove(&self, key: &str) -> (i64, bool) {
        let mut guard = self.data.lock();
        let data = &mut *guard;
        if let Some(old) = data.items.remove(key) {
            data.lru.remove(key);
            let freed = old.size();
            self.mem.fetch_sub(freed, Ordering::Relaxed);
            self.len.fetch_sub(1, Ordering::Relaxed);
            (freed, true)
        } else {
            (0, false)
        }
    }

    /// Clears all entries. Returns (freed_bytes, items_removed).
    pub fn clear(&self) -> (i64, i64) {
        let mut guard = self.data.lock();
        let freed_bytes = self.mem.swap(0, Ordering::Relaxed);
        let items = self.len.swap(0, Ordering::Relaxed);
        guard.items.clear();
        guard.lru.clear();
        (freed_bytes, items)
    }

    /// Gets the number of entries.
    pub fn len(&self) -> i64 {
        self.len.load(Ordering::Relaxed)
    }

    /// Gets the total bytes used by stored values.
    pub fn mem(&self) -> i64 {
        self.mem.load(Ordering::Relaxed)
    }

    /// Gets statistics (bytes, length).
    pub fn stat(&self) -> (i64, i64) {
        (self.mem(), self.len())
    }

    /// Evicts the least recently used entry. Returns the freed bytes, or
    /// None when the store is empty.
    fn evict_one(&self, data: &mut StoreData) -> Option<i64> {
        let key = data.lru.pop_tail()?;
        if let Some(old) = data.items.remove(&*key) {
            let freed = old.size();
            self.mem.fetch_sub(freed, Ordering::Relaxed);
            self.len.fetch_sub(1, Ordering::Relaxed);
            return Some(freed);
        }
        None
    }
}
