//! Shopping lists shared by a family.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::keys::shopping_lists_key;
use crate::cache::SharedCache;
use crate::error::Result;
use crate::services::ResourceClient;

/// A family shopping list. Fields the client does not model are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub family_id: String,
    /// Items grouped by store name
    #[serde(default)]
    pub store_items: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Read-through access to `/family/{familyId}/shoppingLists`.
#[derive(Clone)]
pub struct ShoppingListService {
    cache: SharedCache,
    client: Arc<dyn ResourceClient>,
    base_url: String,
}

impl ShoppingListService {
    pub fn new(cache: SharedCache, client: Arc<dyn ResourceClient>, base_url: impl Into<String>) -> Self {
        Self {
            cache,
            client,
            base_url: base_url.into(),
        }
    }

    fn lists_url(&self, family_id: &str) -> String {
        format!(
            "{}/family/{}/shoppingLists",
            self.base_url.trim_end_matches('/'),
            family_id
        )
    }

    /// Lists of `family_id`, cached under `shopping_lists_cache_<familyId>`.
    pub async fn get_shopping_lists(&self, family_id: &str) -> Result<Vec<ShoppingList>> {
        let key = shopping_lists_key(family_id);
        if let Some(lists) = self.cache.write().await.get::<Vec<ShoppingList>>(&key) {
            return Ok(lists);
        }

        let lists: Vec<ShoppingList> = self
            .client
            .fetch(&self.lists_url(family_id), &[])
            .await?
            .json()?;

        self.cache.write().await.put(&key, &lists);
        Ok(lists)
    }

    /// Saves `list` and drops the family's cached lists so the next read
    /// sees the change. Returns the server's response body.
    pub async fn save_shopping_list(&self, list: &ShoppingList) -> Result<serde_json::Value> {
        let body = serde_json::to_value(list)?;
        let response = self
            .client
            .post_json(&self.lists_url(&list.family_id), &body)
            .await?;

        self.clear_family(&list.family_id).await;

        if response.bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        response.json()
    }

    /// Drops the cached lists of `family_id`.
    pub async fn clear_family(&self, family_id: &str) {
        self.cache
            .write()
            .await
            .invalidate(&shopping_lists_key(family_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{KeyedResponseCache, ManualClock};
    use crate::config::CacheConfig;
    use crate::error::CacheError;
    use crate::services::testing::StubClient;
    use crate::services::FetchedBody;
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::json;

    fn setup() -> (ShoppingListService, Arc<StubClient>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cache = KeyedResponseCache::with_clock(
            store.clone(),
            CacheConfig::shopping_lists(),
            Arc::new(ManualClock::new(0)),
        )
        .unwrap()
        .shared();
        let client = Arc::new(StubClient::new());
        let service = ShoppingListService::new(cache, client.clone(), "https://api.test/api");
        (service, client, store)
    }

    fn lists_json() -> serde_json::Value {
        json!([{
            "id": "l1",
            "familyId": "fam-1",
            "storeItems": {"Costco": ["eggs", "milk"], "Aldi": ["bread"]},
            "createdBy": "alice@x.com"
        }])
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let lists: Vec<ShoppingList> = serde_json::from_value(lists_json()).unwrap();
        assert_eq!(lists[0].store_items["Costco"], vec!["eggs", "milk"]);
        assert_eq!(lists[0].extra["createdBy"], "alice@x.com");

        let back = serde_json::to_value(&lists).unwrap();
        assert_eq!(back, lists_json());
    }

    #[tokio::test]
    async fn test_lists_are_cached_per_family() {
        let (service, client, store) = setup();
        client.push_json(lists_json());

        let first = service.get_shopping_lists("fam-1").await.unwrap();
        let second = service.get_shopping_lists("fam-1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.calls().len(), 1);
        assert_eq!(
            client.calls()[0].url,
            "https://api.test/api/family/fam-1/shoppingLists"
        );
        assert!(store.get("shopping_lists_cache_fam-1").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_invalidates_family_cache() {
        let (service, client, store) = setup();
        client.push_json(lists_json());
        client.push_json(json!({"id": "l2"}));

        service.get_shopping_lists("fam-1").await.unwrap();
        let list = ShoppingList {
            family_id: "fam-1".to_string(),
            ..Default::default()
        };
        let saved = service.save_shopping_list(&list).await.unwrap();

        assert_eq!(saved["id"], "l2");
        assert_eq!(store.get("shopping_lists_cache_fam-1").unwrap(), None);
        let calls = client.calls();
        assert_eq!(calls[1].method, "POST");
        assert_eq!(calls[1].body.as_ref().unwrap()["familyId"], "fam-1");
    }

    #[tokio::test]
    async fn test_save_with_empty_response_body() {
        let (service, client, _) = setup();
        client.push(Ok(FetchedBody::default()));

        let list = ShoppingList {
            family_id: "fam-1".to_string(),
            ..Default::default()
        };
        assert_eq!(
            service.save_shopping_list(&list).await.unwrap(),
            serde_json::Value::Null
        );
    }

    #[tokio::test]
    async fn test_failed_save_keeps_cache() {
        let (service, client, store) = setup();
        client.push_json(lists_json());
        client.push(Err(CacheError::Status {
            url: "https://api.test/api/family/fam-1/shoppingLists".to_string(),
            status: 500,
        }));

        service.get_shopping_lists("fam-1").await.unwrap();
        let list = ShoppingList {
            family_id: "fam-1".to_string(),
            ..Default::default()
        };

        assert!(service.save_shopping_list(&list).await.is_err());
        assert!(store.get("shopping_lists_cache_fam-1").unwrap().is_some());
    }
}
