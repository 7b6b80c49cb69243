//! Error types for the cache and its calling services
//!
//! Provides unified error handling using thiserror. Storage and fetch layers
//! return these errors; `KeyedResponseCache` never lets a storage error reach
//! its caller.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for storage backends, fetchers and configuration.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A write would push the store past its quota
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    /// The backing store cannot be used (poisoned lock, closed handle)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Filesystem failure in a persisted store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote collaborator answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
