use axum::{extract::Extension, Json};
use listing_extraction::STRATEGY_VERSION;
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    /// Whether `render=true` requests can be served
    rendering_proxy: bool,
    strategy_version: u32,
}

/// Health check endpoint
///
/// The service has no backing store, so it is healthy whenever it answers.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rendering_proxy: state.extractor.has_rendering(),
        strategy_version: STRATEGY_VERSION,
    })
}
