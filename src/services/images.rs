//! Image loader: remote images as cached data URLs.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::cache::keys::hash_url;
use crate::cache::SharedCache;
use crate::error::Result;
use crate::services::{FetchedBody, ResourceClient};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Read-through loader for receipt and product images.
#[derive(Clone)]
pub struct ImageService {
    cache: SharedCache,
    client: Arc<dyn ResourceClient>,
}

impl ImageService {
    pub fn new(cache: SharedCache, client: Arc<dyn ResourceClient>) -> Self {
        Self { cache, client }
    }

    /// Returns the image at `url` as a `data:` URL.
    ///
    /// Served from the cache when a live entry exists; otherwise fetched,
    /// encoded and cached. Fetch errors propagate and leave the cache as is.
    pub async fn get_image(&self, url: &str) -> Result<String> {
        let key = hash_url(url);

        if let Some(data_url) = self.cache.write().await.get::<String>(&key) {
            return Ok(data_url);
        }

        let body = self.client.fetch(url, &[]).await?;
        let data_url = to_data_url(&body);
        debug!(url, bytes = body.bytes.len(), "Caching fetched image");

        self.cache.write().await.put(&key, &data_url);
        Ok(data_url)
    }

    /// Drops every cached image.
    pub async fn clear(&self) -> usize {
        self.cache.write().await.clear()
    }
}

/// Encodes a response body as `data:<mime>;base64,<data>`.
pub fn to_data_url(body: &FetchedBody) -> String {
    let mime = body
        .content_type
        .as_deref()
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(FALLBACK_MIME);
    format!("data:{};base64,{}", mime, STANDARD.encode(&body.bytes))
}
