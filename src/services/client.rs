//! HTTP collaborator seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{CacheError, Result};

/// Body of a successful response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedBody {
    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.bytes)?)
    }
}

/// Remote API the services read through.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// GET `url` with the given query pairs.
    async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<FetchedBody>;

    /// POST `body` as JSON to `url`.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<FetchedBody>;
}

// == HTTP Client ==
/// `ResourceClient` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(Duration::from_secs(config.http_timeout))
    }

    async fn read_body(url: &str, response: reqwest::Response) -> Result<FetchedBody> {
        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        debug!(url, len = bytes.len(), "Fetched remote resource");
        Ok(FetchedBody {
            bytes,
            content_type,
        })
    }
}

#[async_trait]
impl ResourceClient for HttpClient {
    async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<FetchedBody> {
        let response = self.inner.get(url).query(query).send().await?;
        Self::read_body(url, response).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<FetchedBody> {
        let response = self.inner.post(url).json(body).send().await?;
        Self::read_body(url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_body_json() {
        let body = FetchedBody {
            bytes: br#"{"pageSize":10}"#.to_vec(),
            content_type: Some("application/json".to_string()),
        };
        let value: serde_json::Value = body.json().unwrap();
        assert_eq!(value["pageSize"], 10);
    }

    #[test]
    fn test_fetched_body_invalid_json() {
        let body = FetchedBody {
            bytes: b"<html>".to_vec(),
            content_type: None,
        };
        assert!(matches!(
            body.json::<serde_json::Value>(),
            Err(CacheError::Serialization(_))
        ));
    }

    #[test]
    fn test_http_client_builds_from_config() {
        assert!(HttpClient::from_config(&Config::default()).is_ok());
    }
}
