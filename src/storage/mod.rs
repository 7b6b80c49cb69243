//! Storage Module
//!
//! The persisted string-keyed store shared by every cache in the process.
//! Caches partition it by key prefix; the store itself knows nothing about
//! namespaces, TTLs or envelopes.

mod file;
mod memory;

use std::fmt;

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

// == Key-Value Store ==
/// Synchronous string key-value store.
///
/// Every method may fail; callers that must stay fail-open (the cache)
/// handle the error at the call site.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Returns the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    /// Returns every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;

    /// Number of stored keys.
    fn len(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Approximate footprint of a string the way browser storage accounts it.
pub(crate) fn utf16_bytes(s: &str) -> usize {
    s.encode_utf16().count() * 2
}
