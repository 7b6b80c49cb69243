//! Configuration Module
//!
//! Handles per-cache configuration and loading session configuration from
//! environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{CacheError, Result};

// == Namespaces ==
/// Storage prefix of the image cache.
pub const IMAGE_NAMESPACE: &str = "image_cache";
/// Storage prefix of the receipt page cache.
pub const RECEIPTS_NAMESPACE: &str = "receipts_cache";
/// Storage prefix of the shopping list cache.
pub const SHOPPING_LISTS_NAMESPACE: &str = "shopping_lists_cache";

const MINUTE_MS: u64 = 60 * 1000;
const DAY_MS: u64 = 24 * 60 * MINUTE_MS;
const MIB: usize = 1024 * 1024;

// == Size Metric ==
/// How the serialized size of an entry is accounted against `max_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMetric {
    /// UTF-16 code units × 2, the way browser storage accounts strings
    #[default]
    Utf16,
    /// Encoded UTF-8 byte length
    Utf8,
}

impl SizeMetric {
    /// Size of `serialized` under this metric.
    pub fn measure(self, serialized: &str) -> usize {
        match self {
            SizeMetric::Utf16 => crate::storage::utf16_bytes(serialized),
            SizeMetric::Utf8 => serialized.len(),
        }
    }
}

// == Cache Config ==
/// Configuration of one `KeyedResponseCache` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Storage key prefix; entries live under `<namespace>_<key>`
    pub namespace: String,
    /// Time-to-live in milliseconds
    pub ttl_ms: u64,
    /// Soft budget for the summed size of live entries
    pub max_bytes: usize,
    /// Size accounting used by the budget
    pub size_metric: SizeMetric,
    /// Remove expired and corrupt entries when the cache is constructed
    pub sweep_on_start: bool,
}

impl CacheConfig {
    pub fn new(namespace: impl Into<String>, ttl_ms: u64, max_bytes: usize) -> Self {
        Self {
            namespace: namespace.into(),
            ttl_ms,
            max_bytes,
            size_metric: SizeMetric::default(),
            sweep_on_start: false,
        }
    }

    /// Image data URLs: 24 hours, 50 MiB, swept at startup.
    pub fn images() -> Self {
        Self {
            sweep_on_start: true,
            ..Self::new(IMAGE_NAMESPACE, DAY_MS, 50 * MIB)
        }
    }

    /// Receipt pages: 5 minutes, 5 MiB.
    pub fn receipts() -> Self {
        Self::new(RECEIPTS_NAMESPACE, 5 * MINUTE_MS, 5 * MIB)
    }

    /// Shopping lists: 5 minutes, 1 MiB.
    pub fn shopping_lists() -> Self {
        Self::new(SHOPPING_LISTS_NAMESPACE, 5 * MINUTE_MS, MIB)
    }

    pub fn with_size_metric(mut self, size_metric: SizeMetric) -> Self {
        self.size_metric = size_metric;
        self
    }

    pub fn with_sweep_on_start(mut self, sweep_on_start: bool) -> Self {
        self.sweep_on_start = sweep_on_start;
        self
    }

    /// Prefix shared by every storage key of this cache.
    pub fn domain_prefix(&self) -> String {
        format!("{}_", self.namespace)
    }

    /// Checks the values a cache cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CacheError::InvalidConfig(
                "cache namespace cannot be empty".to_string(),
            ));
        }
        if self.max_bytes == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "max_bytes for '{}' must be greater than zero",
                self.namespace
            )));
        }
        Ok(())
    }
}

// == Session Config ==
/// Session configuration for the caches and their calling services.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote receipts / family API
    pub api_base_url: String,
    /// File backing the persisted store
    pub store_path: PathBuf,
    /// Image cache TTL in seconds
    pub image_ttl: u64,
    /// Image cache budget in bytes
    pub image_max_bytes: usize,
    /// Receipt page cache TTL in seconds
    pub receipts_ttl: u64,
    /// Receipt page cache budget in bytes
    pub receipts_max_bytes: usize,
    /// Shopping list cache TTL in seconds
    pub shopping_lists_ttl: u64,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP request timeout in seconds
    pub http_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PANTRY_API_BASE_URL` - Remote API base (default: http://localhost:7071/api)
    /// - `PANTRY_STORE_PATH` - Store file (default: pantry_cache.json)
    /// - `IMAGE_CACHE_TTL_SECS` - (default: 86400)
    /// - `IMAGE_CACHE_MAX_BYTES` - (default: 52428800)
    /// - `RECEIPTS_CACHE_TTL_SECS` - (default: 300)
    /// - `RECEIPTS_CACHE_MAX_BYTES` - (default: 5242880)
    /// - `SHOPPING_LISTS_CACHE_TTL_SECS` - (default: 300)
    /// - `SWEEP_INTERVAL` - (default: 60)
    /// - `HTTP_TIMEOUT_SECS` - (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("PANTRY_API_BASE_URL").unwrap_or(defaults.api_base_url),
            store_path: env::var("PANTRY_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            image_ttl: env_or("IMAGE_CACHE_TTL_SECS", defaults.image_ttl),
            image_max_bytes: env_or("IMAGE_CACHE_MAX_BYTES", defaults.image_max_bytes),
            receipts_ttl: env_or("RECEIPTS_CACHE_TTL_SECS", defaults.receipts_ttl),
            receipts_max_bytes: env_or("RECEIPTS_CACHE_MAX_BYTES", defaults.receipts_max_bytes),
            shopping_lists_ttl: env_or("SHOPPING_LISTS_CACHE_TTL_SECS", defaults.shopping_lists_ttl),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            http_timeout: env_or("HTTP_TIMEOUT_SECS", defaults.http_timeout),
        }
    }

    pub fn image_cache(&self) -> CacheConfig {
        CacheConfig {
            ttl_ms: self.image_ttl.saturating_mul(1000),
            max_bytes: self.image_max_bytes,
            ..CacheConfig::images()
        }
    }

    pub fn receipts_cache(&self) -> CacheConfig {
        CacheConfig {
            ttl_ms: self.receipts_ttl.saturating_mul(1000),
            max_bytes: self.receipts_max_bytes,
            ..CacheConfig::receipts()
        }
    }

    pub fn shopping_lists_cache(&self) -> CacheConfig {
        CacheConfig {
            ttl_ms: self.shopping_lists_ttl.saturating_mul(1000),
            ..CacheConfig::shopping_lists()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:7071/api".to_string(),
            store_path: PathBuf::from("pantry_cache.json"),
            image_ttl: 24 * 60 * 60,
            image_max_bytes: 50 * MIB,
            receipts_ttl: 300,
            receipts_max_bytes: 5 * MIB,
            shopping_lists_ttl: 300,
            sweep_interval: 60,
            http_timeout: 30,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
