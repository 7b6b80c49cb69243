//! Pantry Cache - client-side response caching for the grocery assistant
//!
//! Provides read-through caching of images, receipt pages and shopping lists
//! over a shared key-value store, with TTL expiry and size-bounded eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod services;
pub mod storage;
pub mod tasks;
pub mod telemetry;

pub use cache::{KeyedResponseCache, SharedCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
