//! Keyed Response Cache Module
//!
//! Read-through cache over a shared `KeyValueStore` with a fixed TTL and a
//! soft size budget enforced by evicting the oldest write first.
//!
//! Storage failures never leave this module: reads degrade to a miss and
//! writes degrade to "not cached".

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::{CacheEntry, EntryHeader};
use crate::cache::CacheStats;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::storage::KeyValueStore;

/// In-domain entry as seen by a scan.
#[derive(Debug)]
struct ScannedEntry {
    storage_key: String,
    stored_at: u64,
    size: usize,
}

// == Keyed Response Cache ==
/// One logical cache (images, receipt pages, shopping lists) inside the
/// process-wide store.
///
/// Share across tasks as `Arc<tokio::sync::RwLock<KeyedResponseCache>>`;
/// `&mut self` on `put` keeps the write and the budget pass atomic.
#[derive(Debug)]
pub struct KeyedResponseCache {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    stats: CacheStats,
}

impl KeyedResponseCache {
    // == Constructor ==
    /// Creates a cache on `store` using the wall clock.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Result<Self> {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit time source.
    ///
    /// Runs `sweep_expired` first when `config.sweep_on_start` is set.
    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let mut cache = Self {
            store,
            config,
            clock,
            stats: CacheStats::new(),
        };

        if cache.config.sweep_on_start {
            let removed = cache.sweep_expired();
            info!(
                namespace = %cache.config.namespace,
                removed, "Startup sweep complete"
            );
        }

        Ok(cache)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Full storage key for a logical key: `<namespace>_<key>`.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}_{}", self.config.namespace, key)
    }

    // == Get ==
    /// Returns the payload stored under `key` if present and within TTL.
    ///
    /// Expired and undecodable entries are removed and reported as a miss.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let storage_key = self.storage_key(key);

        let raw = match self.store.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %storage_key, "Cache miss");
                self.stats.record_miss();
                return None;
            }
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Cache read failed, treating as miss");
                self.stats.record_miss();
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Corrupt cache entry, removing");
                self.remove_quietly(&storage_key);
                self.stats.record_corrupt();
                self.stats.record_miss();
                return None;
            }
        };

        let now = self.clock.now_millis();
        if entry.is_expired(now, self.config.ttl_ms) {
            debug!(
                key = %storage_key,
                age_ms = entry.age_ms(now),
                "Cache entry expired, removing"
            );
            self.remove_quietly(&storage_key);
            self.stats.record_expiration();
            self.stats.record_miss();
            return None;
        }

        debug!(key = %storage_key, "Cache hit");
        self.stats.record_hit();
        Some(entry.payload)
    }

    // == Put ==
    /// Stores `payload` under `key`, replacing any previous entry, then
    /// enforces the size budget. The budget pass may evict other keys.
    ///
    /// Never fails: if the entry cannot be serialized or written, the store is
    /// left as it was. A payload larger than the whole budget is not written
    /// and any older entry for `key` is dropped.
    pub fn put<T: Serialize + ?Sized>(&mut self, key: &str, payload: &T) {
        let storage_key = self.storage_key(key);
        let entry = CacheEntry::new(payload, self.clock.now_millis());

        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Failed to serialize cache entry, skipping");
                self.stats.record_skipped_write();
                return;
            }
        };

        let size = self.config.size_metric.measure(&serialized);
        if size > self.config.max_bytes {
            debug!(
                key = %storage_key,
                size,
                max_bytes = self.config.max_bytes,
                "Entry larger than cache budget, not caching"
            );
            self.remove_quietly(&storage_key);
            self.stats.record_skipped_write();
            return;
        }

        if let Err(e) = self.store.set(&storage_key, &serialized) {
            warn!(key = %storage_key, error = %e, "Cache write failed, skipping");
            self.stats.record_skipped_write();
            return;
        }

        debug!(key = %storage_key, size, "Cached entry");
        self.enforce_budget();
    }

    // == Invalidate ==
    /// Deletes the entry for `key`. Absent keys are ignored.
    pub fn invalidate(&mut self, key: &str) {
        let storage_key = self.storage_key(key);
        self.remove_quietly(&storage_key);
    }

    // == Clear Namespace ==
    /// Deletes every persisted entry whose storage key starts with `prefix`
    /// (for example `receipts_cache_alice@x.com`). Returns the number removed.
    pub fn clear_namespace(&mut self, prefix: &str) -> usize {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(prefix, error = %e, "Failed to list store keys, nothing cleared");
                return 0;
            }
        };

        let removed = keys
            .iter()
            .filter(|k| k.starts_with(prefix))
            .filter(|k| self.remove_quietly(k))
            .count();

        debug!(prefix, removed, "Cleared cache prefix");
        removed
    }

    /// Deletes every entry of this cache.
    pub fn clear(&mut self) -> usize {
        let prefix = self.config.domain_prefix();
        self.clear_namespace(&prefix)
    }

    // == Sweep Expired ==
    /// Removes every expired or undecodable entry of this cache.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        let mut removed = 0;

        for storage_key in self.domain_keys() {
            let raw = match self.store.get(&storage_key) {
                Ok(Some(raw)) => raw,
                _ => continue,
            };

            match serde_json::from_str::<EntryHeader>(&raw) {
                Ok(header) if header.is_expired(now, self.config.ttl_ms) => {
                    if self.remove_quietly(&storage_key) {
                        self.stats.record_expiration();
                        removed += 1;
                    }
                }
                Ok(_) => {}
                Err(_) => {
                    if self.remove_quietly(&storage_key) {
                        self.stats.record_corrupt();
                        removed += 1;
                    }
                }
            }
        }

        removed
    }

    // == Enforce Budget ==
    /// Evicts the oldest entries (ties broken by smallest key) until the
    /// summed size of this cache's entries fits `max_bytes`.
    ///
    /// Returns the number of entries evicted.
    fn enforce_budget(&mut self) -> usize {
        let mut entries = self.scan();
        let mut total: usize = entries.iter().map(|e| e.size).sum();

        if total <= self.config.max_bytes {
            return 0;
        }

        // Oldest first
        entries.sort_by(|a, b| {
            a.stored_at
                .cmp(&b.stored_at)
                .then_with(|| a.storage_key.cmp(&b.storage_key))
        });

        let mut evicted = 0;
        for entry in entries {
            if total <= self.config.max_bytes {
                break;
            }
            if let Err(e) = self.store.remove(&entry.storage_key) {
                warn!(key = %entry.storage_key, error = %e, "Eviction failed, stopping budget pass");
                break;
            }
            debug!(
                key = %entry.storage_key,
                size = entry.size,
                "Evicted oldest cache entry"
            );
            total -= entry.size;
            evicted += 1;
            self.stats.record_eviction();
        }

        evicted
    }

    // == Usage ==
    /// Number of entries of this cache currently persisted.
    pub fn len(&self) -> usize {
        self.domain_keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summed size of this cache's persisted entries.
    pub fn total_bytes(&self) -> usize {
        self.domain_keys()
            .iter()
            .filter_map(|k| self.store.get(k).ok().flatten())
            .map(|raw| self.config.size_metric.measure(&raw))
            .sum()
    }

    // == Stats ==
    /// Returns current counters and usage.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_usage(self.len(), self.total_bytes());
        stats
    }

    // == Helpers ==
    fn domain_keys(&self) -> Vec<String> {
        let prefix = self.config.domain_prefix();
        match self.store.keys() {
            Ok(keys) => keys.into_iter().filter(|k| k.starts_with(&prefix)).collect(),
            Err(e) => {
                warn!(prefix = %prefix, error = %e, "Failed to list store keys");
                Vec::new()
            }
        }
    }

    /// Reads every in-domain entry, dropping the ones that fail to decode.
    fn scan(&mut self) -> Vec<ScannedEntry> {
        let mut entries = Vec::new();

        for storage_key in self.domain_keys() {
            let raw = match self.store.get(&storage_key) {
                Ok(Some(raw)) => raw,
                _ => continue,
            };

            match serde_json::from_str::<EntryHeader>(&raw) {
                Ok(header) => entries.push(ScannedEntry {
                    size: self.config.size_metric.measure(&raw),
                    stored_at: header.stored_at_epoch_millis,
                    storage_key,
                }),
                Err(_) => {
                    warn!(key = %storage_key, "Corrupt cache entry found during scan, removing");
                    if self.remove_quietly(&storage_key) {
                        self.stats.record_corrupt();
                    }
                }
            }
        }

        entries
    }

    fn remove_quietly(&self, storage_key: &str) -> bool {
        match self.store.remove(storage_key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Failed to remove cache entry");
                false
            }
        }
    }
}
