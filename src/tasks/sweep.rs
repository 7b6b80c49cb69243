//! TTL Sweep Task
//!
//! Background task that periodically removes expired and corrupt entries
//! from one cache, so entries that are never read again do not sit in the
//! store until the budget pass evicts them.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically sweeps `cache`.
///
/// The task loops forever, sleeping for `interval_secs` between runs and
/// taking the write lock only for the duration of one sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which the host aborts on shutdown.
///
/// # Example
/// ```ignore
/// let images = KeyedResponseCache::new(store, CacheConfig::images())?.shared();
/// let sweep_handle = spawn_sweep_task(images.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: SharedCache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        let namespace = cache.read().await.config().namespace.clone();
        info!(
            namespace = %namespace,
            "Starting cache sweep task with interval of {} seconds", interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.sweep_expired()
            };

            if removed > 0 {
                info!(namespace = %namespace, "Cache sweep: removed {} entries", removed);
            } else {
                debug!(namespace = %namespace, "Cache sweep: nothing to remove");
            }
        }
    })
}
