//! HTTP API tests.
//!
//! Drive the router directly with `oneshot`; fetches go to a mock, so no
//! network access is needed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use listing_extraction::{
    FetchResult, Fetcher, ListingExtractor, ListingPage, MockFetcher, RawPage,
};
use listing_server::server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const LISTING_URL: &str = "https://www.ebay.com/itm/1234";
const ENCODED_LISTING_URL: &str = "https%3A%2F%2Fwww.ebay.com%2Fitm%2F1234";

fn app_with(fetcher: &MockFetcher) -> Router {
    let extractor = ListingExtractor::new(Arc::new(fetcher.clone()));
    build_router(AppState::new(extractor), Duration::from_secs(5))
}

fn listing_html() -> String {
    ListingPage::new()
        .og_title("Vintage Levi's 501 | eBay")
        .itemprop_price("45.00")
        .condition_span("Pre-owned")
        .specific("Size", "32")
        .build()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app_with(&MockFetcher::new()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rendering_proxy"], false);
}

#[tokio::test]
async fn test_extract_listing() {
    let fetcher = MockFetcher::new().with_html(LISTING_URL, listing_html());

    let (status, body) = send(
        app_with(&fetcher),
        get(&format!("/api/extract?url={ENCODED_LISTING_URL}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Vintage Levi's 501");
    assert_eq!(body["price"], "45.00");
    assert_eq!(body["condition"], "Pre-owned");
    assert_eq!(body["specifics"]["Size"], "32");
    assert_eq!(body["status"], "partial");
    assert!(body["summary"]
        .as_str()
        .unwrap()
        .starts_with("Title: Vintage Levi's 501\nPrice: $45.00\nCondition: Pre-owned\n"));
    assert_eq!(fetcher.fetch_calls(), vec![LISTING_URL.to_string()]);
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let fetcher = MockFetcher::new();

    for uri in ["/api/extract", "/api/extract?url=", "/api/extract?url=%20%20"] {
        let (status, body) = send(app_with(&fetcher), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "url query parameter is required");
    }
    assert_eq!(fetcher.fetch_call_count(), 0);
}

#[tokio::test]
async fn test_unsupported_host_is_bad_request() {
    let fetcher = MockFetcher::new();

    let (status, body) = send(
        app_with(&fetcher),
        get("/api/extract?url=https%3A%2F%2Fexample.com%2Fitem%2F1"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("example.com"));
    assert_eq!(fetcher.fetch_call_count(), 0);
}

#[tokio::test]
async fn test_upstream_status_is_passed_through() {
    let fetcher = MockFetcher::new().with_status(LISTING_URL, 403, "Access Denied");

    let (status, body) = send(
        app_with(&fetcher),
        get(&format!("/api/extract?url={ENCODED_LISTING_URL}")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Access Denied" }));
}

#[tokio::test]
async fn test_transport_failure_is_bad_gateway() {
    let fetcher = MockFetcher::new().with_transport_error(LISTING_URL, "connection reset");

    let (status, body) = send(
        app_with(&fetcher),
        get(&format!("/api/extract?url={ENCODED_LISTING_URL}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "connection reset");
}

#[tokio::test]
async fn test_render_without_proxy_is_server_error() {
    let fetcher = MockFetcher::new().with_html(LISTING_URL, listing_html());

    let (status, body) = send(
        app_with(&fetcher),
        get(&format!("/api/extract?url={ENCODED_LISTING_URL}&render=true")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("RENDERING_PROXY_API_KEY"));
    assert_eq!(fetcher.fetch_call_count(), 0);
}

#[tokio::test]
async fn test_extract_from_posted_html() {
    let fetcher = MockFetcher::new();

    let (status, body) = send(
        app_with(&fetcher),
        post_json(
            "/api/extract/html",
            &json!({ "html": listing_html(), "url": LISTING_URL }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Vintage Levi's 501");
    assert_eq!(body["url"], LISTING_URL);
    assert_eq!(fetcher.fetch_call_count(), 0);

    let (status, body) = send(
        app_with(&fetcher),
        post_json("/api/extract/html", &json!({ "html": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "html is required");
}

#[tokio::test]
async fn test_fallback_summary_over_http() {
    let (status, body) = send(
        app_with(&MockFetcher::new()),
        post_json(
            "/api/extract/html",
            &json!({ "html": "<html><body><p>Nothing to see</p></body></html>" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], listing_extraction::MANUAL_ENTRY_FALLBACK);
    assert_eq!(body["status"], "empty");
}

#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/extract")
        .header(header::ORIGIN, "https://wardrobe.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = app_with(&MockFetcher::new()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

/// Fetcher that panics, to exercise the panic handler.
struct PanickingFetcher;

#[async_trait]
impl Fetcher for PanickingFetcher {
    async fn fetch(&self, _url: &str) -> FetchResult<RawPage> {
        panic!("fetcher exploded")
    }
}

#[tokio::test]
async fn test_panic_becomes_server_error() {
    let extractor = ListingExtractor::new(Arc::new(PanickingFetcher));
    let app = build_router(AppState::new(extractor), Duration::from_secs(5));

    let (status, body) = send(app, get(&format!("/api/extract?url={ENCODED_LISTING_URL}"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal error: fetcher exploded");
}
