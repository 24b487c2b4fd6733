//! Mock fetcher for testing.
//!
//! Provides a configurable mock implementation of the Fetcher trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{Fetcher, RawPage};

/// Canned outcome for one URL.
#[derive(Debug, Clone)]
enum MockResponse {
    Page(RawPage),
    Status { status: u16, message: String },
    Transport(String),
}

/// Mock fetcher for testing.
///
/// Serves canned pages or failures per URL and records every request.
/// Unknown URLs fail with HTTP 404.
///
/// # Example
///
/// ```rust
/// use listing_extraction::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_html("https://www.ebay.com/itm/1", "<title>Jacket</title>")
///     .with_status("https://www.ebay.com/itm/2", 403, "blocked");
///
/// assert_eq!(mock.fetch_call_count(), 0);
/// ```
#[derive(Default)]
pub struct MockFetcher {
    /// Canned responses indexed by URL
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    /// Track calls for verification
    fetch_calls: Arc<RwLock<Vec<String>>>,
    name: Option<String>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name reported by `Fetcher::name` (defaults to "mock").
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a page that will be returned for its URL.
    pub fn add_page(&self, page: RawPage) {
        let mut responses = self.responses.write().unwrap();
        responses.insert(page.url.clone(), MockResponse::Page(page));
    }

    /// Serve `html` for `url` (builder pattern).
    pub fn with_html(self, url: &str, html: impl Into<String>) -> Self {
        self.add_page(RawPage::new(url, html));
        self
    }

    /// Answer `url` with a non-2xx status (builder pattern).
    pub fn with_status(self, url: &str, status: u16, message: impl Into<String>) -> Self {
        self.responses.write().unwrap().insert(
            url.to_string(),
            MockResponse::Status {
                status,
                message: message.into(),
            },
        );
        self
    }

    /// Fail `url` as if the network were unreachable (builder pattern).
    pub fn with_transport_error(self, url: &str, message: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.to_string(), MockResponse::Transport(message.into()));
        self
    }

    /// Get the number of times fetch was called.
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.read().unwrap().len()
    }

    /// Get the URLs that were requested, in order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.read().unwrap().clone()
    }

    /// Clear all recorded calls.
    pub fn reset_calls(&self) {
        self.fetch_calls.write().unwrap().clear();
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            fetch_calls: Arc::clone(&self.fetch_calls),
            name: self.name.clone(),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<RawPage> {
        self.fetch_calls.write().unwrap().push(url.to_string());

        let response = self.responses.read().unwrap().get(url).cloned();
        match response {
            Some(MockResponse::Page(page)) => Ok(page),
            Some(MockResponse::Status { status, message }) => {
                Err(FetchError::Status { status, message })
            }
            Some(MockResponse::Transport(message)) => Err(FetchError::Transport { message }),
            None => Err(FetchError::Status {
                status: 404,
                message: format!("no mock response for {url}"),
            }),
        }
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("mock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_pages() {
        let mock = MockFetcher::new().with_html("https://www.ebay.com/itm/1", "<p>hi</p>");

        let page = mock.fetch("https://www.ebay.com/itm/1").await.unwrap();
        assert_eq!(page.html, "<p>hi</p>");
        assert_eq!(page.status, 200);
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let mock = MockFetcher::new()
            .with_status("https://www.ebay.com/itm/2", 403, "blocked")
            .with_transport_error("https://www.ebay.com/itm/3", "connection refused");

        let err = mock.fetch("https://www.ebay.com/itm/2").await.unwrap_err();
        assert_eq!(err.status(), 403);

        let err = mock.fetch("https://www.ebay.com/itm/3").await.unwrap_err();
        assert_eq!(err.status(), 0);

        let err = mock.fetch("https://www.ebay.com/itm/404").await.unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn test_mock_call_tracking() {
        let mock = MockFetcher::new().named("direct");
        let shared = mock.clone();

        let _ = mock.fetch("https://www.ebay.com/itm/a").await;
        let _ = shared.fetch("https://www.ebay.com/itm/b").await;

        assert_eq!(mock.fetch_call_count(), 2);
        assert_eq!(
            mock.fetch_calls(),
            vec![
                "https://www.ebay.com/itm/a".to_string(),
                "https://www.ebay.com/itm/b".to_string(),
            ]
        );
        assert_eq!(mock.name(), "direct");

        mock.reset_calls();
        assert_eq!(shared.fetch_call_count(), 0);
    }
}
