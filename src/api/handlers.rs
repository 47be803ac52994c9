//! API Handlers
//!
//! HTTP request handlers for the proxy and the control surface.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header::HeaderName, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::{MemoryStorage, ServedFrom};
use crate::config::Config;
use crate::error::Result;
use crate::http::{FetchRequest, HttpResponse, RequestMode};
use crate::models::{
    AcceptedResponse, ControlMessage, HealthResponse, StatsResponse, SyncResponse,
};
use crate::network::{Network, ReqwestNetwork};
use crate::worker::{FetchOutcome, OfflineCache};

/// Response header reporting where a proxied response came from.
pub const SERVED_FROM_HEADER: &str = "x-offline-cache";

/// Headers tied to the upstream connection rather than the response.
const HOP_BY_HOP: &[&str] = &["connection", "content-length", "keep-alive", "transfer-encoding"];

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The cache manager
    pub cache: Arc<OfflineCache>,
    /// Network used for requests the manager passes through
    pub network: Arc<dyn Network>,
}

impl AppState {
    /// Creates a new AppState sharing one network between the manager and passthrough.
    pub fn new(cache: Arc<OfflineCache>, network: Arc<dyn Network>) -> Self {
        Self { cache, network }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses in-memory storage and the reqwest network.
    pub fn from_config(config: &Config) -> Result<Self> {
        let network: Arc<dyn Network> = Arc::new(ReqwestNetwork::new()?);
        let storage = Arc::new(MemoryStorage::new());
        let cache = OfflineCache::new(config.clone(), storage, network.clone())?;
        Ok(Self::new(Arc::new(cache), network))
    }
}

/// Fallback handler: every request outside the control surface.
///
/// Runs the request through the interceptor; passed-through requests go
/// straight to the network.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let request = build_fetch_request(state.cache.origin(), &method, &uri, &headers, body);

    match state.cache.handle_fetch(request).await {
        FetchOutcome::Respond(served) => Ok(into_response(served.response, Some(served.source))),
        FetchOutcome::Passthrough(request) => {
            let response = state.network.fetch(&request).await?;
            Ok(into_response(response, None))
        }
    }
}

/// Handler for POST /_offline/message
pub async fn message_handler(
    State(state): State<AppState>,
    Json(message): Json<ControlMessage>,
) -> Result<Response> {
    let kind = message.kind();

    match state.cache.handle_message(message).await? {
        Some(reply) => Ok(Json(reply).into_response()),
        None => Ok((StatusCode::ACCEPTED, Json(AcceptedResponse::new(kind))).into_response()),
    }
}

/// Handler for POST /_offline/sync/:tag
pub async fn sync_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<SyncResponse> {
    let handled = state.cache.handle_sync(&tag).await;
    Json(SyncResponse::new(tag, handled))
}

/// Handler for POST /_offline/periodic-sync/:tag
pub async fn periodic_sync_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<SyncResponse> {
    let handled = state.cache.handle_periodic_sync(&tag).await;
    Json(SyncResponse::new(tag, handled))
}

/// Handler for GET /_offline/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache_state = state.cache.state().await;
    let stats = state.cache.stats().await;

    Json(StatsResponse::new(
        cache_state,
        state.cache.partitions().version(),
        stats,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Conversions ==
/// Maps an inbound request onto the origin.
pub fn build_fetch_request(
    origin: &url::Url,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> FetchRequest {
    // Only path and query are taken from the client; scheme and host are always the origin's
    let mut url = origin.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());

    let mut request = FetchRequest::new(method.as_str(), url);
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            request = request.append_header(name.as_str(), value);
        }
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let navigate = match request.header_value("sec-fetch-mode") {
        Some(mode) => mode.eq_ignore_ascii_case("navigate"),
        None => {
            request.method == "GET"
                && request
                    .header_value("accept")
                    .map(|a| a.contains("text/html"))
                    .unwrap_or(false)
        }
    };
    if navigate {
        request = request.mode(RequestMode::Navigate);
    }

    debug!(method = %request.method, url = %request.url, navigate, "Inbound request");
    request
}

/// Converts a buffered response into an axum response.
pub fn into_response(response: HttpResponse, source: Option<ServedFrom>) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut out = Response::new(Body::from(response.body));
    *out.status_mut() = status;

    let headers = out.headers_mut();
    for (name, value) in response.headers.iter() {
        if HOP_BY_HOP.contains(&name) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }
    if let Some(source) = source {
        headers.insert(SERVED_FROM_HEADER, HeaderValue::from_static(source.as_str()));
    }

    out
}
