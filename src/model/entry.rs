//! Cache entry models.

use bytes::Bytes;
use std::sync::Arc;

/// Entry represents a single cached object.
///
/// The key is shared with the recency list node addressing the same entry,
/// and the value is reference-counted, so cloning an entry never copies the
/// stored bytes.
#[derive(Clone)]
pub struct Entry {
    key: Arc<str>,
    val: Bytes,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(key: impl Into<Arc<str>>, val: Bytes) -> Self {
        Self {
            key: key.into(),
            val,
        }
    }

    /// Gets the entry key.
    pub fn key(&self) -> &Arc<str> {
        &self.key
    }

    /// Gets the stored value.
    pub fn value(&self) -> Bytes {
        self.val.clone()
    }

    /// Size of the stored value in bytes.
    pub fn size(&self) -> i64 {
        self.val.len() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_size_matches_value_len() {
        let e = Entry::new("k", Bytes::from(vec![0u8; 128]));
        assert_eq!(e.size(), 128);
        assert_eq!(e.value().len(), 128);
        assert_eq!(&**e.key(), "k");
    }

    #[test]
    fn test_empty_entry_has_zero_size() {
        let e = Entry::new("empty", Bytes::new());
        assert_eq!(e.size(), 0);
        assert!(e.value().is_empty());
    }

    #[test]
    fn test_clone_shares_value() {
        let e = Entry::new("k", Bytes::from_static(b"payload"));
        let c = e.clone();
        assert_eq!(e.value(), c.value());
        assert!(Arc::ptr_eq(e.key(), c.key()));
    }
}
