//! Testing utilities.
//!
//! HTML fixture builders and a scenario helper, so applications using the
//! library can test against realistic listing pages without network calls.

use std::sync::Arc;

use crate::fetchers::MockFetcher;
use crate::pipeline::ListingExtractor;

/// Builder for a synthetic marketplace listing page.
///
/// Each setter adds the markup a real marketplace uses for that field.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    head: Vec<String>,
    body: Vec<String>,
}

impl ListingPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<meta property="og:title">`
    pub fn og_title(mut self, title: &str) -> Self {
        self.head.push(format!(
            r#"<meta property="og:title" content="{}">"#,
            html_escape::encode_double_quoted_attribute(title)
        ));
        self
    }

    /// `<title>` element
    pub fn document_title(mut self, title: &str) -> Self {
        self.head.push(format!(
            "<title>{}</title>",
            html_escape::encode_text(title)
        ));
        self
    }

    /// Machine-readable price attribute
    pub fn itemprop_price(mut self, price: &str) -> Self {
        self.body.push(format!(
            r#"<div class="x-price-primary"><span itemprop="price" content="{price}">US ${price}</span></div>"#
        ));
        self
    }

    /// Condition shown as an icon-text span
    pub fn condition_span(mut self, condition: &str) -> Self {
        self.body.push(format!(
            r#"<div class="x-item-condition"><span class="ux-icon-text__text"><span class="clipped">{}</span></span></div>"#,
            html_escape::encode_text(condition)
        ));
        self
    }

    /// One item-specifics row in the marketplace's label/value layout
    pub fn specific(mut self, label: &str, value: &str) -> Self {
        self.body.push(format!(
            r#"<div class="ux-layout-section__row"><div class="ux-labels-values__labels"><span>{}</span></div><div class="ux-labels-values__values"><span>{}</span></div></div>"#,
            html_escape::encode_text(label),
            html_escape::encode_text(value)
        ));
        self
    }

    /// Inline seller description
    pub fn inline_description(mut self, text: &str) -> Self {
        self.body.push(format!(
            r#"<div data-testid="x-item-description"><div>{}</div></div>"#,
            html_escape::encode_text(text)
        ));
        self
    }

    /// Description frame pointing at `src`
    pub fn description_frame(mut self, src: &str) -> Self {
        self.body.push(format!(
            r#"<iframe id="desc_ifr" src="{}" title="Seller description"></iframe>"#,
            html_escape::encode_double_quoted_attribute(src)
        ));
        self
    }

    /// A JSON-LD block with arbitrary content
    pub fn json_ld(mut self, json: &serde_json::Value) -> Self {
        self.head.push(format!(
            r#"<script type="application/ld+json">{json}</script>"#
        ));
        self
    }

    /// Arbitrary markup appended to the body
    pub fn raw(mut self, html: &str) -> Self {
        self.body.push(html.to_string());
        self
    }

    pub fn build(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head>{}</head><body>{}</body></html>",
            self.head.join(""),
            self.body.join("\n")
        )
    }
}

/// A mock fetcher and an extractor wired to it.
pub struct TestScenario {
    fetcher: MockFetcher,
}

impl TestScenario {
    /// Create a new test scenario.
    pub fn new() -> Self {
        Self {
            fetcher: MockFetcher::new(),
        }
    }

    /// Serve `page` at `url`.
    pub fn with_page(mut self, url: &str, page: &ListingPage) -> Self {
        self.fetcher = self.fetcher.with_html(url, page.build());
        self
    }

    /// Serve raw `html` at `url`.
    pub fn with_html(mut self, url: &str, html: impl Into<String>) -> Self {
        self.fetcher = self.fetcher.with_html(url, html);
        self
    }

    /// Fail requests for `url` with `status`.
    pub fn with_status(mut self, url: &str, status: u16, message: &str) -> Self {
        self.fetcher = self.fetcher.with_status(url, status, message);
        self
    }

    /// Extractor using the mock as its direct fetcher, plus the mock itself
    /// for call assertions.
    pub fn build(self) -> (ListingExtractor, MockFetcher) {
        let extractor = ListingExtractor::new(Arc::new(self.fetcher.clone()));
        (extractor, self.fetcher)
    }
}

impl Default for TestScenario {
    fn default() -> Self {
        Self::new()
    }
}
