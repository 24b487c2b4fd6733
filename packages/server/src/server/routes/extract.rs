use axum::{
    extract::{Extension, Query},
    Json,
};
use listing_extraction::{ExtractOptions, ListingRecord};
use serde::Deserialize;

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExtractQuery {
    pub url: Option<String>,
    /// Fetch through the rendering proxy
    #[serde(default)]
    pub render: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExtractHtmlRequest {
    #[serde(default)]
    pub html: String,
    pub url: Option<String>,
}

/// `GET /api/extract?url=...&render=true`
pub async fn extract_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ExtractQuery>,
) -> Result<Json<ListingRecord>, ApiError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("url query parameter is required"))?;

    let options = ExtractOptions {
        use_rendering_proxy: query.render,
    };
    let record = state.extractor.extract_listing(url, options).await?;
    Ok(Json(record))
}

/// `POST /api/extract/html` with `{ "html": "...", "url": "..." }`
pub async fn extract_html_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ExtractHtmlRequest>,
) -> Result<Json<ListingRecord>, ApiError> {
    if request.html.trim().is_empty() {
        return Err(ApiError::bad_request("html is required"));
    }

    let record = state
        .extractor
        .extract_from_html(request.url.as_deref(), &request.html)
        .await?;
    Ok(Json(record))
}
