//! The ListingExtractor - main entry point for the extraction library.
//!
//! Validates the URL, fetches the page through the selected fetcher and
//! runs every source in confidence order over one shared partial record:
//!
//! 1. structured product data (JSON-LD)
//! 2. pattern strategies for title, price and condition
//! 3. item specifics
//! 4. description (inline, then the optional sub-document)
//!
//! Each source only fills what is still empty, so a later source can never
//! replace an earlier one.

use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use super::description::{DescriptionResolution, DescriptionResolver};
use super::fields::extract_fields;
use super::specifics::extract_specifics;
use super::strategies::{PageText, STRATEGY_VERSION};
use super::structured::extract_structured;
use super::summary::build_summary;
use crate::error::{ExtractionError, Result};
use crate::security::{SourceAllowlist, RENDERING_PROXY_API_KEY_ENV};
use crate::text;
use crate::traits::fetcher::Fetcher;
use crate::types::config::{ExtractOptions, ExtractionConfig};
use crate::types::listing::{Field, ListingRecord, PartialListing};

/// Turns a marketplace listing URL (or its HTML) into a [`ListingRecord`].
///
/// Stateless across requests; share one instance behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use listing_extraction::{ExtractOptions, HttpFetcher, ListingExtractor};
///
/// let extractor = ListingExtractor::new(Arc::new(HttpFetcher::new()?));
/// let record = extractor
///     .extract_listing("https://www.ebay.com/itm/1234", ExtractOptions::direct())
///     .await?;
/// println!("{}", record.summary);
/// ```
pub struct ListingExtractor {
    /// Plain HTTP fetcher, also used for description sub-documents
    direct: Arc<dyn Fetcher>,
    /// Script-executing fetcher, when configured
    rendering: Option<Arc<dyn Fetcher>>,
    allowlist: SourceAllowlist,
    config: ExtractionConfig,
}

impl ListingExtractor {
    /// Create an extractor with the default allow-list and config.
    pub fn new(direct: Arc<dyn Fetcher>) -> Self {
        Self {
            direct,
            rendering: None,
            allowlist: SourceAllowlist::default(),
            config: ExtractionConfig::default(),
        }
    }

    /// Enable `ExtractOptions::use_rendering_proxy`.
    pub fn with_rendering(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.rendering = Some(fetcher);
        self
    }

    pub fn with_allowlist(mut self, allowlist: SourceAllowlist) -> Self {
        self.allowlist = allowlist;
        self
    }

    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn has_rendering(&self) -> bool {
        self.rendering.is_some()
    }

    /// Fetch and extract one listing.
    ///
    /// The URL is validated before any network call. A failed primary
    /// fetch is fatal; a failed sub-document fetch only degrades the
    /// description.
    pub async fn extract_listing(&self, url: &str, options: ExtractOptions) -> Result<ListingRecord> {
        let parsed = self.allowlist.validate(url)?;
        let fetcher = self.fetcher_for(options)?;

        info!(url = %parsed, fetcher = fetcher.name(), "Extracting listing");
        let page = fetcher.fetch(parsed.as_str()).await?;
        debug!(
            url = %parsed,
            status = page.status,
            bytes = page.html.len(),
            "Primary fetch complete"
        );

        Ok(self.run(Some(parsed.to_string()), &page.html).await)
    }

    /// Extract from HTML the caller already has.
    ///
    /// `url` is optional and only used for the record and for resolving a
    /// relative description frame; it must still be a well-formed http(s)
    /// URL when given.
    pub async fn extract_from_html(&self, url: Option<&str>, html: &str) -> Result<ListingRecord> {
        if html.trim().is_empty() {
            return Err(ExtractionError::invalid_input("html is empty"));
        }

        let url = match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => {
                let parsed = Url::parse(raw).map_err(|e| {
                    ExtractionError::invalid_input(format!("malformed url {raw:?}: {e}"))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ExtractionError::invalid_input(format!(
                        "unsupported url scheme: {}",
                        parsed.scheme()
                    )));
                }
                Some(parsed.to_string())
            }
            None => None,
        };

        info!(url = url.as_deref().unwrap_or("-"), bytes = html.len(), "Extracting listing from supplied HTML");
        Ok(self.run(url, html).await)
    }

    fn fetcher_for(&self, options: ExtractOptions) -> Result<&Arc<dyn Fetcher>> {
        if !options.use_rendering_proxy {
            return Ok(&self.direct);
        }
        self.rendering.as_ref().ok_or_else(|| {
            ExtractionError::ConfigurationMissing(format!(
                "{RENDERING_PROXY_API_KEY_ENV} must be set to use the rendering proxy"
            ))
        })
    }

    fn resolver(&self) -> DescriptionResolver {
        DescriptionResolver::new(
            Arc::clone(&self.direct),
            self.allowlist.clone(),
            self.config.clone(),
        )
    }

    async fn run(&self, url: Option<String>, html: &str) -> ListingRecord {
        let resolver = self.resolver();

        // the parsed document is not Send, so it never lives across the await
        let (mut listing, stage_one) = self.scan(html, url.as_deref(), &resolver);
        let resolution = resolver.subdocument_stage(stage_one).await;

        if let Some((description, source)) = resolution.into_best() {
            listing.fill(Field::Description, description, source);
        }
        self.truncate_description(&mut listing);

        let summary = build_summary(&listing, self.config.min_description_chars);
        let record = listing.into_record(url, summary);

        info!(
            url = record.url.as_deref().unwrap_or("-"),
            status = ?record.status,
            specifics = record.specifics.len(),
            missing = ?record.missing_fields,
            strategy_version = STRATEGY_VERSION,
            "Listing extracted"
        );
        record
    }

    /// Every synchronous source, in confidence order.
    fn scan(
        &self,
        html: &str,
        url: Option<&str>,
        resolver: &DescriptionResolver,
    ) -> (PartialListing, DescriptionResolution) {
        let document = Html::parse_document(html);

        let mut listing = extract_structured(&document);
        if listing
            .description
            .as_deref()
            .is_some_and(|d| text::char_len(d) <= self.config.min_description_chars)
        {
            listing.clear(Field::Description);
        }

        extract_fields(&PageText::new(html), &mut listing);
        extract_specifics(&document, html, &mut listing);

        let resolution = if listing.has(Field::Description) {
            DescriptionResolution::default()
        } else {
            resolver.inline_stage(&document, html, url)
        };
        (listing, resolution)
    }

    fn truncate_description(&self, listing: &mut PartialListing) {
        let Some(description) = listing.description.take() else {
            return;
        };
        let (kept, truncated) = text::truncate_chars(&description, self.config.max_description_chars);
        if truncated {
            debug!(
                chars = text::char_len(&description),
                max = self.config.max_description_chars,
                "Description truncated"
            );
        }
        listing.description_truncated = truncated;
        listing.description = Some(kept.trim_end().to_string());
    }
}
