//! Rendering-proxy fetcher.
//!
//! Routes the request through a third-party proxy that loads the page in a
//! headless browser, runs its scripts, waits a fixed settle interval and
//! returns the rendered document. Slower and metered, but it recovers
//! content the direct fetch cannot see.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult, Result};
use crate::security::credentials::{rendering_proxy_key_from_env, SecretString};
use crate::text::truncate_chars;
use crate::traits::fetcher::{Fetcher, RawPage};

/// Default proxy endpoint.
pub const DEFAULT_RENDERING_PROXY_URL: &str = "https://app.scrapingbee.com/api/v1/";

/// Default settle interval before the proxy snapshots the page.
pub const DEFAULT_RENDER_WAIT_MS: u64 = 3000;

/// Longest proxy error body echoed back to the caller.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Fetcher that executes page scripts through a rendering proxy.
///
/// # Example
///
/// ```rust,ignore
/// use listing_extraction::fetchers::RenderingProxyFetcher;
///
/// let fetcher = RenderingProxyFetcher::from_env()?.with_wait_ms(5000);
/// let page = fetcher.fetch("https://www.depop.com/products/abc").await?;
/// ```
pub struct RenderingProxyFetcher {
    client: Client,
    api_key: SecretString,
    endpoint: String,
    /// Settle interval passed to the proxy (milliseconds)
    wait_ms: u64,
}

impl RenderingProxyFetcher {
    /// Create a new proxy fetcher with the given API key.
    pub fn new(api_key: impl Into<SecretString>) -> FetchResult<Self> {
        let wait_ms = DEFAULT_RENDER_WAIT_MS;
        let client = Client::builder()
            .timeout(request_timeout(wait_ms))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: DEFAULT_RENDERING_PROXY_URL.to_string(),
            wait_ms,
        })
    }

    /// Create from environment variable `RENDERING_PROXY_API_KEY`.
    ///
    /// Fails with `ConfigurationMissing` when the key is absent.
    pub fn from_env() -> Result<Self> {
        let api_key = rendering_proxy_key_from_env()?;
        Ok(Self::new(api_key)?)
    }

    /// Point at a different proxy endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the settle interval (milliseconds).
    pub fn with_wait_ms(mut self, wait_ms: u64) -> Self {
        self.wait_ms = wait_ms;
        self
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }

    fn query(&self, url: &str) -> [(&'static str, String); 4] {
        [
            ("api_key", self.api_key.expose().to_string()),
            ("url", url.to_string()),
            ("render_js", "true".to_string()),
            ("wait", self.wait_ms.to_string()),
        ]
    }
}

/// The proxy needs the settle interval on top of a normal page load.
fn request_timeout(wait_ms: u64) -> Duration {
    Duration::from_secs(60) + Duration::from_millis(wait_ms)
}

#[async_trait]
impl Fetcher for RenderingProxyFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<RawPage> {
        debug!(url = %url, wait_ms = self.wait_ms, "Rendering proxy fetch starting");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(url))
            .timeout(request_timeout(self.wait_ms))
            .send()
            .await
            .map_err(|e| {
                // reqwest embeds the full request URL in its errors, api_key included
                warn!(url = %url, "Rendering proxy request failed");
                FetchError::Transport {
                    message: format!("rendering proxy unreachable: {}", e.without_url()),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Rendering proxy returned an error");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: format!(
                    "rendering proxy error: {}",
                    truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS).0
                ),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let html = response.text().await.map_err(|e| FetchError::Transport {
            message: format!("failed to read rendered page: {}", e.without_url()),
        })?;

        debug!(url = %url, bytes = html.len(), "Rendering proxy fetch complete");

        let mut page = RawPage::new(url, html).with_status(status.as_u16());
        page.content_type = content_type;
        Ok(page)
    }

    fn name(&self) -> &str {
        "rendering_proxy"
    }
}
