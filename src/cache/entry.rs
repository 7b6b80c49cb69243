//! Cache Entry Module
//!
//! Defines the persisted envelope of a cache entry and its expiry rules.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Persisted form of one cached payload.
///
/// Serialized as `{"storedAtEpochMillis": <u64>, "payload": <T>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Wall-clock time of the write (Unix milliseconds)
    pub stored_at_epoch_millis: u64,
    /// The cached value
    pub payload: T,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry stamped with `now_ms`.
    pub fn new(payload: T, now_ms: u64) -> Self {
        Self {
            stored_at_epoch_millis: now_ms,
            payload,
        }
    }

    // == Age ==
    /// Milliseconds since the write. A clock that moved backwards yields 0.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at_epoch_millis)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl_ms`.
    ///
    /// Boundary condition: an entry is expired only once its age is strictly
    /// greater than the TTL, so an entry read exactly `ttl_ms` after the write
    /// is still served.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) > ttl_ms
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64, ttl_ms: u64) -> u64 {
        ttl_ms.saturating_sub(self.age_ms(now_ms))
    }
}

/// Envelope view that skips decoding the payload.
///
/// Used by scans, which only need the write time but must still reject
/// values that are not a well-formed envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryHeader {
    pub stored_at_epoch_millis: u64,
    #[allow(dead_code)]
    pub payload: IgnoredAny,
}

impl EntryHeader {
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at_epoch_millis) > ttl_ms
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = CacheEntry::new("data:image/png;base64,AA==", 42);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"storedAtEpochMillis":42,"payload":"data:image/png;base64,AA=="}"#
        );
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("v", 1_000);

        assert!(!entry.is_expired(1_000 + 499, 500));
        assert!(!entry.is_expired(1_000 + 500, 500), "age == ttl is still live");
        assert!(entry.is_expired(1_000 + 501, 500));
    }

    #[test]
    fn test_clock_behind_write_time_is_not_expired() {
        let entry = CacheEntry::new("v", 10_000);
        assert_eq!(entry.age_ms(9_000), 0);
        assert!(!entry.is_expired(9_000, 0));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("v", 0);
        assert_eq!(entry.ttl_remaining_ms(250, 1_000), 750);
        assert_eq!(entry.ttl_remaining_ms(5_000, 1_000), 0);
    }

    #[test]
    fn test_header_requires_payload() {
        let ok: Result<EntryHeader, _> =
            serde_json::from_str(r#"{"storedAtEpochMillis":5,"payload":{"items":[]}}"#);
        assert_eq!(ok.unwrap().stored_at_epoch_millis, 5);

        let missing: Result<EntryHeader, _> = serde_json::from_str(r#"{"storedAtEpochMillis":5}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_header_rejects_legacy_shape() {
        let legacy: Result<EntryHeader, _> =
            serde_json::from_str(r#"{"timestamp":5,"data":"abc"}"#);
        assert!(legacy.is_err());
    }
}
