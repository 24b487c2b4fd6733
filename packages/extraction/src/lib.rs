//! Marketplace Listing Extraction Library
//!
//! Turns a clothing listing page from a second-hand marketplace into a
//! best-effort structured record (title, price, condition, item specifics,
//! seller description) plus a plain-text summary for downstream readers.
//!
//! # Design Philosophy
//!
//! **Degrade, don't fail.**
//!
//! - Marketplace HTML is unreliable and changes often; every field has an
//!   ordered list of strategies and a missing field is a normal outcome
//! - Sources are applied from most to least trusted, and a value is never
//!   overwritten once set
//! - Only a bad URL, a missing credential or a failed primary fetch abort
//!   a request
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use listing_extraction::{ExtractOptions, HttpFetcher, ListingExtractor, RenderingProxyFetcher};
//!
//! let extractor = ListingExtractor::new(Arc::new(HttpFetcher::new()?))
//!     .with_rendering(Arc::new(RenderingProxyFetcher::from_env()?));
//!
//! let record = extractor
//!     .extract_listing("https://www.ebay.com/itm/1234", ExtractOptions::direct())
//!     .await?;
//!
//! println!("{}", record.summary);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - The `Fetcher` abstraction
//! - [`types`] - Listing record and configuration types
//! - [`pipeline`] - Structured data, strategy tables, specifics, description, summary
//! - [`fetchers`] - Direct, rendering-proxy and mock fetchers
//! - [`security`] - Marketplace allow-list and credential handling
//! - [`text`] - Markup stripping and text normalization
//! - [`testing`] - Fixture builders for tests

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractionError, FetchError, FetchResult, Result};
pub use traits::fetcher::{Fetcher, RawPage};
pub use types::{
    config::{ExtractOptions, ExtractionConfig},
    listing::{ExtractionStatus, Field, FieldSource, ListingRecord, PartialListing},
};

// Re-export the extractor and pipeline components
pub use pipeline::{
    build_summary, DescriptionResolution, DescriptionResolver, ListingExtractor,
    MANUAL_ENTRY_FALLBACK, NO_DESCRIPTION_NOTE, STRATEGY_VERSION,
};

// Re-export fetchers
pub use fetchers::{HttpFetcher, MockFetcher, RenderingProxyFetcher};

// Re-export security
pub use security::{SecretString, SourceAllowlist, DEFAULT_MARKETPLACE_DOMAINS};

// Re-export testing utilities
pub use testing::{ListingPage, TestScenario};
