//! In-process key-value store.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::BTreeMap;

/// Map-backed store with an optional total-size quota.
///
/// The quota counts key and value bytes of every entry, the way browser
/// local storage limits apply per origin.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    writes: usize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store refusing writes beyond `quota_bytes` in total.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Raw access for tests that plant or inspect persisted payloads.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota_bytes) = self.quota_bytes {
            let requested_bytes = self.used_bytes_without(key) + key.len() + value.len();
            if requested_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    requested_bytes,
                    quota_bytes,
                });
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn set_overwrites_and_counts_writes() {
        let mut store = MemoryKvStore::new();
        store.set("notes", "[]").unwrap();
        store.set("notes", "[1]").unwrap();

        assert_eq!(store.get("notes").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("missing").unwrap(), None);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        let mut store = MemoryKvStore::with_quota(12);
        store.set("k", "0123456789").unwrap();
        store.set("k", "abcdefghij").unwrap();

        let err = store.set("k", "abcdefghijkl").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("abcdefghij"));
        assert_eq!(store.write_count(), 2);
    }
}
