//! Cache Module
//!
//! Read-through response caching with TTL expiry and size-bounded,
//! oldest-first eviction over a shared key-value store.

mod clock;
mod entry;
mod keyed;
pub mod keys;
mod stats;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use keyed::KeyedResponseCache;
pub use stats::CacheStats;

/// Cache handle shared by services and background tasks.
pub type SharedCache = Arc<RwLock<KeyedResponseCache>>;

impl KeyedResponseCache {
    /// Wraps the cache for sharing across tasks.
    pub fn shared(self) -> SharedCache {
        Arc::new(RwLock::new(self))
    }
}
