//! Fetcher implementations.
//!
//! All fetchers implement [`Fetcher`](crate::traits::fetcher::Fetcher) and
//! are interchangeable: the pipeline never knows which one produced a page.
//!
//! - [`HttpFetcher`] - direct request with a browser-like signature
//! - [`RenderingProxyFetcher`] - JavaScript rendering through a paid proxy
//! - [`MockFetcher`] - canned responses for tests

pub mod http;
pub mod mock;
pub mod rendering_proxy;

pub use http::{HttpFetcher, BROWSER_USER_AGENT};
pub use mock::MockFetcher;
pub use rendering_proxy::{RenderingProxyFetcher, DEFAULT_RENDERING_PROXY_URL, DEFAULT_RENDER_WAIT_MS};
