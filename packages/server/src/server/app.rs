//! Application setup and server configuration.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use listing_extraction::{HttpFetcher, ListingExtractor, RenderingProxyFetcher};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::error::ApiError;
use crate::server::routes::{extract_handler, extract_html_handler, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<ListingExtractor>,
}

impl AppState {
    pub fn new(extractor: ListingExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

/// Build the extractor described by `config`.
///
/// Without a rendering proxy key the extractor still serves direct
/// requests; `render=true` then fails with a configuration error.
pub fn build_extractor(config: &Config) -> Result<ListingExtractor> {
    let direct = HttpFetcher::with_timeout(config.fetch_timeout)
        .context("Failed to create HTTP fetcher")?;

    let mut extractor = ListingExtractor::new(Arc::new(direct)).with_allowlist(config.allowlist());

    match &config.rendering_proxy_api_key {
        Some(api_key) => {
            let mut proxy = RenderingProxyFetcher::new(api_key.clone())
                .context("Failed to create rendering proxy fetcher")?
                .with_wait_ms(config.render_wait_ms);
            if let Some(endpoint) = &config.rendering_proxy_url {
                proxy = proxy.with_endpoint(endpoint);
            }
            tracing::info!(wait_ms = config.render_wait_ms, "Rendering proxy enabled");
            extractor = extractor.with_rendering(Arc::new(proxy));
        }
        None => {
            tracing::warn!("RENDERING_PROXY_API_KEY not set, render=true requests will fail");
        }
    }

    Ok(extractor)
}

/// Build the Axum application router from configuration.
pub fn build_app(config: &Config) -> Result<Router> {
    let extractor = build_extractor(config)?;
    Ok(build_router(AppState::new(extractor), config.request_timeout))
}

/// Build the router around an existing state (used by tests).
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    // CORS configuration - any origin may call the extraction API
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/extract", get(extract_handler))
        .route("/api/extract/html", post(extract_html_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Turn a handler panic into a JSON 500 carrying the panic message.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::internal(format!("internal error: {message}")).into_response()
}
