//! Network Module
//!
//! The upstream side of every intercepted fetch: a `Network` port, its
//! reqwest-backed implementation, and the timeout race used by the strategies.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::http::{FetchRequest, Headers, HttpResponse};

// == Network Port ==
/// Performs real fetches on behalf of the cache.
///
/// Any response that arrives, whatever its status, is `Ok`; only transport
/// failures are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<HttpResponse>;
}

// == Timeout Race ==
/// Races a fetch against a timer.
///
/// The fetch runs as its own task. If the timer wins, the task is detached
/// rather than cancelled and may still complete later; its result is dropped.
pub async fn fetch_with_timeout(
    network: Arc<dyn Network>,
    request: FetchRequest,
    timeout: Duration,
) -> Result<HttpResponse> {
    let url = request.url.clone();
    let task = tokio::spawn(async move { network.fetch(&request).await });

    let result = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(CacheError::Internal(format!(
            "Fetch task failed: {}",
            join_error
        ))),
        Err(_) => Err(CacheError::Timeout(timeout)),
    };

    if let Err(e) = &result {
        warn!(url = %url, error = %e, "Network request failed");
    }
    result
}

// == Reqwest Network ==
/// Fetches from the real network using a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestNetwork {
    client: Client,
}

impl ReqwestNetwork {
    /// Creates a network with a default client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("offline-cache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CacheError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Creates a network from a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Network for ReqwestNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| CacheError::InvalidRequest(format!("Invalid method: {}", e)))?;

        debug!(method = %method, url = %request.url, "Fetching from network");

        let mut builder = self.client.request(method, request.url.clone());
        for (key, value) in request.headers.iter() {
            // Hop-by-hop and host headers belong to the inbound connection
            if matches!(key, "host" | "connection" | "content-length") {
                continue;
            }
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CacheError::Network(format!("Request timed out: {}", e))
            } else if e.is_connect() {
                CacheError::Network(format!("Connection failed: {}", e))
            } else {
                CacheError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let mut headers = Headers::new();
        for (key, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.append(key.as_str(), value);
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Network(format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
