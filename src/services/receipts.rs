//! Receipts fetcher: paginated receipt history, cached per user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::cache::keys::{receipts_key, receipts_page_key};
use crate::cache::SharedCache;
use crate::error::Result;
use crate::services::ResourceClient;

/// A scanned receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub user_id: String,
    pub family_id: String,
    pub receipt_text: String,
    pub blob_url: String,
    /// Server timestamp, kept as sent
    pub created_at: String,
}

/// One page of a user's receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPage {
    pub items: Vec<Receipt>,
    #[serde(default)]
    pub continuation_token: Option<String>,
    pub page_size: u32,
    pub has_more_results: bool,
}

/// Read-through access to `GET /receipts`.
///
/// The first page lives under `receipts_cache_<email>`, continuation pages
/// under the same prefix, so `clear_user` drops all of them.
pub struct ReceiptsService {
    cache: SharedCache,
    client: Arc<dyn ResourceClient>,
    base_url: String,
    loading: watch::Sender<bool>,
}

impl ReceiptsService {
    pub fn new(cache: SharedCache, client: Arc<dyn ResourceClient>, base_url: impl Into<String>) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            cache,
            client,
            base_url: base_url.into(),
            loading,
        }
    }

    /// Observes whether a receipts request is in flight.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// First page of `email`'s receipts.
    ///
    /// A cached page fetched with a different page size counts as a miss.
    pub async fn get_receipts(&self, email: &str, page_size: u32) -> Result<ReceiptPage> {
        let key = receipts_key(email);
        if let Some(page) = self.cached_page(&key, page_size).await {
            return Ok(page);
        }
        self.fetch_and_cache(&key, email, page_size, None).await
    }

    /// Re-fetches the first page and overwrites the cached copy.
    pub async fn refresh_receipts(&self, email: &str, page_size: u32) -> Result<ReceiptPage> {
        self.fetch_and_cache(&receipts_key(email), email, page_size, None)
            .await
    }

    /// Page following `continuation_token`.
    pub async fn load_next_page(
        &self,
        email: &str,
        continuation_token: &str,
        page_size: u32,
    ) -> Result<ReceiptPage> {
        let key = receipts_page_key(email, continuation_token);
        if let Some(page) = self.cached_page(&key, page_size).await {
            return Ok(page);
        }
        self.fetch_and_cache(&key, email, page_size, Some(continuation_token))
            .await
    }

    /// Drops every cached page of `email`. Returns the number removed.
    pub async fn clear_user(&self, email: &str) -> usize {
        let mut cache = self.cache.write().await;
        let prefix = cache.storage_key(&receipts_key(email));
        cache.clear_namespace(&prefix)
    }

    async fn cached_page(&self, key: &str, page_size: u32) -> Option<ReceiptPage> {
        self.cache
            .write()
            .await
            .get::<ReceiptPage>(key)
            .filter(|page| page.page_size == page_size)
    }

    async fn fetch_and_cache(
        &self,
        key: &str,
        email: &str,
        page_size: u32,
        continuation_token: Option<&str>,
    ) -> Result<ReceiptPage> {
        let url = format!("{}/receipts", self.base_url.trim_end_matches('/'));
        let mut query = vec![("email", email.to_string()), ("pageSize", page_size.to_string())];
        if let Some(token) = continuation_token {
            query.push(("continuationToken", token.to_string()));
        }

        let fetched = {
            let _loading = LoadingGuard::start(&self.loading);
            self.client.fetch(&url, &query).await
        };

        let page: ReceiptPage = fetched?.json()?;
        debug!(
            items = page.items.len(),
            has_more = page.has_more_results,
            "Fetched receipt page"
        );

        self.cache.write().await.put(key, &page);
        Ok(page)
    }
}

// == Loading Guard ==
/// Holds the loading flag up while alive, including when the request future
/// is dropped before completing.
struct LoadingGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self { flag }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}
