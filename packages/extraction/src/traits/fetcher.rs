//! Fetcher trait for pluggable page retrieval.
//!
//! Two interchangeable strategies implement it: a direct HTTP fetch with a
//! browser-like signature, and a fetch through a JavaScript-rendering proxy.
//! Everything downstream of the fetch is identical for both.
//!
//! # Usage
//!
//! ```rust,ignore
//! use listing_extraction::{Fetcher, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new()?;
//! let page = fetcher.fetch("https://www.ebay.com/itm/123").await?;
//! println!("{} bytes of HTML", page.html.len());
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// Raw HTML returned by a fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    /// URL that was requested
    pub url: String,

    /// URL after redirects (same as `url` when unknown)
    pub final_url: String,

    /// Response body
    pub html: String,

    /// HTTP status of the final response
    pub status: u16,

    /// Content-Type header if present
    pub content_type: Option<String>,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,
}

impl RawPage {
    /// Create a successful page with minimal fields.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            html: html.into(),
            status: 200,
            content_type: Some("text/html".to_string()),
            fetched_at: Utc::now(),
        }
    }

    /// Set the post-redirect URL.
    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    /// Set the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Retrieves raw HTML for one URL.
///
/// Implementations make exactly one attempt. Retry policy belongs to the
/// caller.
///
/// - `HttpFetcher` - direct fetch, fast, no script execution
/// - `RenderingProxyFetcher` - rendering proxy, slow, paid, sees client-rendered content
/// - `MockFetcher` - canned responses for tests
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single URL.
    ///
    /// Non-2xx responses are `FetchError::Status`; network failures are
    /// `FetchError::Transport`.
    async fn fetch(&self, url: &str) -> FetchResult<RawPage>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
