//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle through the router: the proxy
//! fallback and each control endpoint.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{body_for, Harness};
use offline_cache::api::{create_router, SERVED_FROM_HEADER};
use offline_cache::cache::{Partition, PartitionKind};
use offline_cache::network::Network;
use offline_cache::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(harness: &Harness) -> Router {
    let network: Arc<dyn Network> = harness.network.clone();
    create_router(AppState::new(harness.cache.clone(), network))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn message(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/_offline/message")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// == Proxy Tests ==

#[tokio::test]
async fn test_proxy_caches_image_and_reports_source() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(get("/img/logo.svg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SERVED_FROM_HEADER], "network");
    assert_eq!(body_to_string(response.into_body()).await, body_for("/img/logo.svg"));

    let response = create_test_app(&harness)
        .oneshot(get("/img/logo.svg"))
        .await
        .unwrap();
    assert_eq!(response.headers()[SERVED_FROM_HEADER], "cache");
}

#[tokio::test]
async fn test_proxy_offline_navigation_gets_offline_page() {
    let harness = Harness::active("v1").await;
    harness.network.set_offline(true);

    let request = Request::builder()
        .uri("/blog/unknown")
        .header("accept", "text/html")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(&harness).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SERVED_FROM_HEADER], "offline-page");
    assert_eq!(body_to_string(response.into_body()).await, body_for("/offline.html"));
}

#[tokio::test]
async fn test_proxy_offline_subresource_is_503() {
    let harness = Harness::active("v1").await;
    harness.network.set_offline(true);

    let response = create_test_app(&harness)
        .oneshot(get("/blog/data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[SERVED_FROM_HEADER], "offline");
    assert_eq!(
        body_to_string(response.into_body()).await,
        "Offline - Content not available"
    );
}

#[tokio::test]
async fn test_proxy_passes_through_before_install() {
    let harness = Harness::new("v1");

    let response = create_test_app(&harness)
        .oneshot(get("/docs/intro"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SERVED_FROM_HEADER).is_none());
    assert_eq!(
        harness.network.requested(),
        vec!["https://docs.example.com/docs/intro".to_string()]
    );
}

#[tokio::test]
async fn test_proxy_only_fetches_from_origin() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(get("//internal.host/secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requested = harness.network.requested();
    let last = requested.last().unwrap();
    assert!(last.starts_with("https://docs.example.com/"), "fetched {}", last);
    assert!(requested.iter().all(|url| !url.contains("://internal.host")));

    let name = harness.cache.partitions().name(PartitionKind::Dynamic);
    let partition = harness.storage.partition(&name).await.unwrap();
    for key in partition.keys().await.unwrap() {
        assert!(key.url.starts_with("https://docs.example.com/"), "cached {}", key.url);
    }
}

#[tokio::test]
async fn test_proxy_keeps_repeated_response_headers() {
    let harness = Harness::active("v1").await;

    for expected_source in ["network", "cache"] {
        let response = create_test_app(&harness)
            .oneshot(get("/img/logo.svg"))
            .await
            .unwrap();
        assert_eq!(response.headers()[SERVED_FROM_HEADER], expected_source);

        let cookies: Vec<&str> = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies, vec!["session=1", "theme=dark"]);
    }
}

#[tokio::test]
async fn test_cache_urls_outside_origin_is_bad_request() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(message(
            r#"{"type":"CACHE_URLS","urls":["//169.254.169.254/latest/meta-data"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness
        .network
        .requested()
        .iter()
        .all(|url| url.starts_with("https://docs.example.com/")));
}

#[tokio::test]
async fn test_proxy_passthrough_network_failure_is_bad_gateway() {
    let harness = Harness::new("v1");
    harness.network.set_offline(true);

    let response = create_test_app(&harness)
        .oneshot(get("/docs/intro"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == Message Endpoint Tests ==

#[tokio::test]
async fn test_get_cache_size_on_empty_cache() {
    let harness = Harness::new("v1");

    let response = create_test_app(&harness)
        .oneshot(message(r#"{"type":"GET_CACHE_SIZE"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::json!({ "totalSize": 0 }));
}

#[tokio::test]
async fn test_clear_cache_is_accepted() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(message(r#"{"type":"CLEAR_CACHE"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "accepted");
    assert_eq!(json["type"], "CLEAR_CACHE");
    assert_eq!(harness.cache.cache_size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cache_urls_message() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(message(r#"{"type":"CACHE_URLS","urls":["/docs/advanced"]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    harness.network.set_offline(true);
    let response = create_test_app(&harness)
        .oneshot(get("/docs/advanced"))
        .await
        .unwrap();
    assert_eq!(response.headers()[SERVED_FROM_HEADER], "cache");
}

#[tokio::test]
async fn test_cache_urls_with_empty_entry_is_bad_request() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(message(r#"{"type":"CACHE_URLS","urls":[""]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_unknown_message_type_is_rejected() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(message(r#"{"type":"REBOOT"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Sync Endpoint Tests ==

#[tokio::test]
async fn test_sync_endpoints_report_handled_tags() {
    let harness = Harness::active("v1").await;

    let response = create_test_app(&harness)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_offline/sync/cache-cleanup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tag"], "cache-cleanup");
    assert_eq!(json["handled"], true);

    let response = create_test_app(&harness)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_offline/periodic-sync/something-else")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["handled"], false);
}

// == Stats / Health Tests ==

#[tokio::test]
async fn test_stats_endpoint_reports_state_and_counters() {
    let harness = Harness::active("v1").await;
    create_test_app(&harness)
        .oneshot(get("/img/logo.svg"))
        .await
        .unwrap();

    let response = create_test_app(&harness)
        .oneshot(get("/_offline/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["state"], "activated");
    assert_eq!(json["version"], "v1");
    assert_eq!(json["network_responses"], 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let harness = Harness::new("v1");

    let response = create_test_app(&harness).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
