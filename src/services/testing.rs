//! Scripted `ResourceClient` for service unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::services::{FetchedBody, ResourceClient};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Answers requests from a queue; an empty queue answers 404.
#[derive(Debug, Default)]
pub struct StubClient {
    responses: Mutex<VecDeque<Result<FetchedBody>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, value: serde_json::Value) {
        self.push(Ok(FetchedBody {
            bytes: value.to_string().into_bytes(),
            content_type: Some("application/json".to_string()),
        }));
    }

    pub fn push(&self, response: Result<FetchedBody>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: RecordedCall) -> Result<FetchedBody> {
        let url = call.url.clone();
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CacheError::Status { url, status: 404 }))
    }
}

#[async_trait]
impl ResourceClient for StubClient {
    async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<FetchedBody> {
        self.answer(RecordedCall {
            method: "GET",
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: None,
        })
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<FetchedBody> {
        self.answer(RecordedCall {
            method: "POST",
            url: url.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }
}

/// Never answers; for exercising cancelled requests.
#[derive(Debug, Default)]
pub struct PendingClient;

#[async_trait]
impl ResourceClient for PendingClient {
    async fn fetch(&self, _url: &str, _query: &[(&str, String)]) -> Result<FetchedBody> {
        std::future::pending().await
    }

    async fn post_json(&self, _url: &str, _body: &serde_json::Value) -> Result<FetchedBody> {
        std::future::pending().await
    }
}
