//! Shared fixtures: a scripted transport and an in-memory platform.

#![allow(dead_code)]

use async_trait::async_trait;
use pawfeed::api::{ApiRequest, ApiResponse, Method, Transport};
use pawfeed::features::UnconfiguredIdentityProvider;
use pawfeed::navigation::MemoryHistory;
use pawfeed::storage::MemoryStore;
use pawfeed::{Platform, Result};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = dyn Fn(&ApiRequest) -> (u16, Value) + Send + Sync;

/// Transport answering from a closure and recording every request.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    delay: Option<Duration>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(responder: impl Fn(&ApiRequest) -> (u16, Value) + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request after `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(|_| (200, Value::Null))
        }
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|r| r.url.trim_start_matches("http://api.test").to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let (status, body) = (self.responder)(&request);
        Ok(ApiResponse { status, body })
    }
}

pub fn dog_json(slug: &str) -> Value {
    json!({
        "id": format!("id-{slug}"),
        "slug": slug,
        "name": "Nelli",
        "breed": "Finnish Lapphund",
        "owner_id": "u1",
        "followers_count": 3,
    })
}

/// Answers the endpoints the views load with small fixed bodies.
pub fn api_fixture(request: &ApiRequest) -> (u16, Value) {
    let path = request.url.trim_start_matches("http://api.test");
    let path = path.split('?').next().unwrap_or(path);
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (request.method, segments.as_slice()) {
        (Method::Get, ["feed"]) => (200, json!({ "posts": [] })),
        (Method::Get, ["dogs", "search"]) => (200, json!([dog_json("nelli-1")])),
        (Method::Get, ["dogs", _, "posts"]) => (200, json!([])),
        (Method::Get, ["dogs", slug]) => (200, dog_json(slug)),
        (Method::Get, ["messages"]) => (200, json!([])),
        (Method::Get, ["messages", "unread-count"]) => (200, json!({ "count": 2 })),
        (Method::Post, ["dogs", _, "follow"]) => (204, Value::Null),
        (Method::Post, ["invites"]) => (201, json!({ "code": "WOOF42", "created_at": "2026-10-01T12:00:00Z" })),
        _ => (404, json!({ "error": "Not found" })),
    }
}

pub fn config() -> pawfeed::Config {
    pawfeed::Config {
        api_base_url: "http://api.test".to_string(),
        app_base_url: "https://pawfeed.example.com".to_string(),
        ..Default::default()
    }
}

pub struct Fixture {
    pub history: Arc<MemoryHistory>,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<ScriptedTransport>,
}

impl Fixture {
    pub fn new(initial: &str, transport: ScriptedTransport) -> Self {
        Self {
            history: Arc::new(MemoryHistory::new(initial)),
            store: Arc::new(MemoryStore::new()),
            transport: Arc::new(transport),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform {
            history: self.history.clone(),
            store: self.store.clone(),
            transport: self.transport.clone(),
            identity: Arc::new(UnconfiguredIdentityProvider),
        }
    }
}
