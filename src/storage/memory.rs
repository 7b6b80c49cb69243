//! In-memory store with an optional browser-style quota.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{CacheError, Result};
use crate::storage::{utf16_bytes, KeyValueStore};

// == Memory Store ==
/// Process-local `KeyValueStore`.
///
/// With a quota set, a write that would push the accounted size (UTF-16 code
/// units × 2 of every key and value) past the quota fails with
/// `QuotaExceeded` and leaves the previous value untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> Result<usize> {
        let entries = self.lock()?;
        Ok(entries
            .iter()
            .map(|(k, v)| utf16_bytes(k) + utf16_bytes(v))
            .sum())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::StorageUnavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| utf16_bytes(k) + utf16_bytes(v))
                .sum();
            let needed = utf16_bytes(key) + utf16_bytes(value);
            if used + needed > quota {
                return Err(CacheError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available: quota.saturating_sub(used),
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_remove_absent_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn test_keys_are_enumerable() {
        let store = MemoryStore::new();
        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.len().unwrap(), 2);
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn test_quota_rejects_write_and_keeps_previous_value() {
        // "k" + "v1" = 6 bytes, "k" + "value" = 12 bytes
        let store = MemoryStore::with_quota(10);
        store.set("k", "v1").unwrap();

        let result = store.set("k", "value");
        assert!(matches!(result, Err(CacheError::QuotaExceeded { .. })));
        assert_eq!(store.get("k").unwrap(), Some("v1".to_string()));
    }

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let store = MemoryStore::with_quota(12);
        store.set("k", "value").unwrap();
        // Overwriting with a same-sized value fits because the old one is released
        store.set("k", "other").unwrap();
        assert_eq!(store.used_bytes().unwrap(), 12);
    }
}
