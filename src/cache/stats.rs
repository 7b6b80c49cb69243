//! Cache Statistics Module
//!
//! Tracks hits, misses, expirations, evictions and swallowed storage failures.

use serde::Serialize;

// == Cache Stats ==
/// Counters for one `KeyedResponseCache`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Lookups that returned a payload
    pub hits: u64,
    /// Lookups that returned nothing (absent, expired, corrupt or unreadable)
    pub misses: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Entries removed to satisfy the size budget
    pub evictions: u64,
    /// Entries removed because they could not be decoded
    pub corrupt_entries: u64,
    /// Puts that left the store untouched (serialization, oversize, storage failure)
    pub skipped_writes: u64,
    /// Entries currently persisted under the cache's prefix
    pub total_entries: usize,
    /// Summed size of those entries under the configured metric
    pub total_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Corrupt ==
    /// Increments the corrupt-entry counter.
    pub fn record_corrupt(&mut self) {
        self.corrupt_entries += 1;
    }

    // == Record Skipped Write ==
    /// Increments the skipped-write counter.
    pub fn record_skipped_write(&mut self) {
        self.skipped_writes += 1;
    }

    // == Update Usage ==
    /// Replaces the entry count and byte total of the cache's prefix.
    pub fn set_usage(&mut self, total_entries: usize, total_bytes: usize) {
        self.total_entries = total_entries;
        self.total_bytes = total_bytes;
    }
}
