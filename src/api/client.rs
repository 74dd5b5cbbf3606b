//! Typed wrapper around the HTTP API.
//!
//! Every call:
//!
//! 1. joins the configured base URL with the endpoint path,
//! 2. attaches the session's bearer token when signed in,
//! 3. races the transport against the client-side deadline,
//! 4. turns non-2xx responses into [`PawfeedError::Http`] using the
//!    `{ "error": "..." }` envelope,
//! 5. decodes 2xx bodies into the requested type.

use super::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::HealthStatus;
use crate::storage::ClientStorage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Client-side deadline applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP API client shared by every feature service.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    timeout: Duration,
    storage: Arc<ClientStorage>,
}

impl ApiClient {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: &str,
        timeout: Duration,
        storage: Arc<ClientStorage>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            storage,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/dogs/rex`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// `GET path`, decoding the body.
    ///
    /// # Errors
    ///
    /// Network, timeout, HTTP, or decoding failures.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.request(Method::Get, path, RequestBody::Empty).await?;
        decode(body)
    }

    /// `POST path` with a JSON body, decoding the response.
    ///
    /// # Errors
    ///
    /// Network, timeout, HTTP, or decoding failures.
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        decode(self.request(Method::Post, path, body).await?)
    }

    /// `PUT path` with a JSON body, decoding the response.
    ///
    /// # Errors
    ///
    /// Network, timeout, HTTP, or decoding failures.
    pub async fn put<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        decode(self.request(Method::Put, path, body).await?)
    }

    /// `POST path` without a body, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Network, timeout, or HTTP failures.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        self.request(Method::Post, path, RequestBody::Empty).await?;
        Ok(())
    }

    /// `DELETE path`, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Network, timeout, or HTTP failures.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::Delete, path, RequestBody::Empty).await?;
        Ok(())
    }

    /// `PUT` raw bytes to an absolute URL (presigned uploads). No bearer token is sent.
    ///
    /// # Errors
    ///
    /// Network, timeout, or HTTP failures.
    pub async fn put_bytes(&self, url: &str, content_type: &str, data: Vec<u8>) -> Result<()> {
        let request = ApiRequest {
            method: Method::Put,
            url: url.to_string(),
            bearer: None,
            body: RequestBody::Bytes {
                content_type: content_type.to_string(),
                data,
            },
        };
        self.execute(request).await?;
        Ok(())
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Network, timeout, HTTP, or decoding failures.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    /// Sends a request to `path` and returns the raw JSON body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Network, timeout, or HTTP failures.
    pub async fn request(&self, method: Method, path: &str, body: RequestBody) -> Result<serde_json::Value> {
        let bearer = self.storage.token()?;
        let request = ApiRequest {
            method,
            url: self.url(path),
            bearer,
            body,
        };
        self.execute(request).await
    }

    async fn execute(&self, request: ApiRequest) -> Result<serde_json::Value> {
        let method = request.method.as_str();
        let url = request.url.clone();

        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| PawfeedError::Timeout(self.timeout))?
            .map_err(|e| {
                tracing::debug!(method, %url, error = %e, "request failed");
                e
            })?;

        tracing::debug!(method, %url, status = response.status, "response received");
        into_result(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn into_result(response: ApiResponse) -> Result<serde_json::Value> {
    if response.is_success() {
        return Ok(response.body);
    }

    let message = response
        .body
        .get("error")
        .and_then(serde_json::Value::as_str)
        .map_or_else(
            || format!("Request failed with status {}", response.status),
            str::to_string,
        );

    Err(PawfeedError::Http {
        status: response.status,
        message,
        body: response.body,
    })
}

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T> {
    Ok(serde_json::from_value(body)?)
}
