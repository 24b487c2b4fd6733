//! Seller description recovery.
//!
//! The description lives either inline in the listing page or in a
//! separate sub-document the page embeds in a frame. Resolution is an
//! explicit two-stage object:
//!
//! - stage 1 ([`DescriptionResolver::inline_stage`]) is synchronous: it
//!   finds the inline candidate and, when that is too short, the
//!   sub-document URL;
//! - stage 2 ([`DescriptionResolver::subdocument_stage`]) fetches and
//!   cleans the sub-document. Its failure is recorded on the result and
//!   never propagated.
//!
//! [`DescriptionResolution::into_best`] keeps the longer candidate.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;
use crate::security::{is_description_host, SourceAllowlist};
use crate::text;
use crate::traits::fetcher::Fetcher;
use crate::types::config::ExtractionConfig;
use crate::types::listing::FieldSource;

/// Inline description containers, most specific first.
const INLINE_SELECTORS: &[&str] = &[
    "[data-testid='x-item-description']",
    "[data-testid*='description']",
    "#viTabs_0_is",
    "#desc_div",
    "#ds_div",
    "#item-description",
    ".item-description",
    ".x-item-description",
    ".product-description",
    "[itemprop='description']",
];

lazy_static! {
    static ref INLINE_SELECTOR_TABLE: Vec<Selector> = INLINE_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect();

    static ref SECTION_HEADING_SELECTOR: Selector = Selector::parse("h2, h3, h4").unwrap();

    static ref SUBDOCUMENT_PATTERNS: Vec<Regex> = vec![
        // frame pointing at the description host
        Regex::new(r#"(?is)<iframe\b[^>]*?\bsrc\s*=\s*["']([^"']*ebaydesc[^"']*)["']"#).unwrap(),
        // frame identified as the description frame
        Regex::new(r#"(?is)<iframe\b[^>]*?\bid\s*=\s*["'][^"']*desc[^"']*["'][^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).unwrap(),
        Regex::new(r#"(?is)<iframe\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'][^>]*?\bid\s*=\s*["'][^"']*desc[^"']*["']"#).unwrap(),
        // JSON field carrying the URL
        Regex::new(r#""(?:descriptionUrl|descriptionURL|descUrl|descriptionFrameUrl)"\s*:\s*"([^"]+)""#).unwrap(),
    ];
}

/// Both description candidates and what happened to the secondary fetch.
#[derive(Debug, Default)]
pub struct DescriptionResolution {
    /// Cleaned inline text, if longer than the noise threshold
    pub inline: Option<String>,

    /// Discovered sub-document URL
    pub subdocument_url: Option<String>,

    /// Cleaned sub-document text, if fetched and longer than the noise threshold
    pub subdocument: Option<String>,

    /// Why the secondary fetch failed (recorded, not raised)
    pub subdocument_error: Option<FetchError>,
}

impl DescriptionResolution {
    /// Whether stage 2 should run.
    pub fn needs_subdocument(&self) -> bool {
        self.subdocument_url.is_some()
    }

    /// The longer candidate and where it came from. Inline wins ties.
    pub fn into_best(self) -> Option<(String, FieldSource)> {
        match (self.inline, self.subdocument) {
            (Some(inline), Some(sub)) if text::char_len(&sub) > text::char_len(&inline) => {
                Some((sub, FieldSource::SubDocument))
            }
            (Some(inline), _) => Some((inline, FieldSource::PagePattern)),
            (None, Some(sub)) => Some((sub, FieldSource::SubDocument)),
            (None, None) => None,
        }
    }
}

/// Two-stage description lookup.
pub struct DescriptionResolver {
    /// Used for the secondary fetch; rendering is never needed for frames
    fetcher: Arc<dyn Fetcher>,
    allowlist: SourceAllowlist,
    config: ExtractionConfig,
}

impl DescriptionResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, allowlist: SourceAllowlist, config: ExtractionConfig) -> Self {
        Self {
            fetcher,
            allowlist,
            config,
        }
    }

    /// Stage 1: inline candidate plus, when it is not enough, the
    /// sub-document URL.
    pub fn inline_stage(
        &self,
        document: &Html,
        html: &str,
        page_url: Option<&str>,
    ) -> DescriptionResolution {
        let inline = self.find_inline(document);

        let enough = inline
            .as_deref()
            .is_some_and(|d| text::char_len(d) >= self.config.sufficient_description_chars);

        let subdocument_url = if enough {
            None
        } else {
            discover_subdocument_urls(html, page_url)
                .into_iter()
                .find(|url| self.may_fetch(url))
        };

        debug!(
            inline_chars = inline.as_deref().map(text::char_len).unwrap_or(0),
            subdocument = subdocument_url.is_some(),
            "Inline description stage complete"
        );

        DescriptionResolution {
            inline,
            subdocument_url,
            ..Default::default()
        }
    }

    /// Stage 2: fetch and clean the sub-document, if stage 1 found one.
    pub async fn subdocument_stage(&self, mut resolution: DescriptionResolution) -> DescriptionResolution {
        let Some(url) = resolution.subdocument_url.clone() else {
            return resolution;
        };

        match self.fetcher.fetch(&url).await {
            Ok(page) => {
                let cleaned = text::clean_multiline(&page.html);
                debug!(url = %url, chars = text::char_len(&cleaned), "Fetched description sub-document");
                resolution.subdocument = self.meaningful(cleaned);
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Description sub-document fetch failed, continuing without it");
                resolution.subdocument_error = Some(e);
            }
        }
        resolution
    }

    /// Both stages for a raw page.
    pub async fn resolve(&self, html: &str, page_url: Option<&str>) -> DescriptionResolution {
        let stage_one = {
            let document = Html::parse_document(html);
            self.inline_stage(&document, html, page_url)
        };
        self.subdocument_stage(stage_one).await
    }

    fn find_inline(&self, document: &Html) -> Option<String> {
        INLINE_SELECTOR_TABLE
            .iter()
            .flat_map(|selector| document.select(selector))
            .find_map(|element| self.meaningful(element_text(&element)))
            .or_else(|| self.find_section(document))
    }

    /// Text following a heading that mentions "description".
    fn find_section(&self, document: &Html) -> Option<String> {
        document
            .select(&SECTION_HEADING_SELECTOR)
            .filter(|h| {
                h.text()
                    .collect::<String>()
                    .to_lowercase()
                    .contains("description")
            })
            .find_map(|heading| {
                let section: String = heading
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .take_while(|el| !matches!(el.value().name(), "h1" | "h2" | "h3" | "h4"))
                    .map(|el| el.html())
                    .collect::<Vec<_>>()
                    .join(" ");
                self.meaningful(text::clean_fragment(&section))
            })
    }

    fn meaningful(&self, candidate: String) -> Option<String> {
        (text::char_len(&candidate) > self.config.min_description_chars).then_some(candidate)
    }

    /// Only description hosts or allowed marketplace hosts are fetched.
    fn may_fetch(&self, url: &str) -> bool {
        let allowed = is_description_host(url)
            || Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| self.allowlist.allows_host(h)))
                .unwrap_or(false);
        if !allowed {
            debug!(url = %url, "Ignoring description frame on unknown host");
        }
        allowed
    }
}

/// Cleaned text of an element, falling back to a `content` attribute.
fn element_text(element: &ElementRef<'_>) -> String {
    let cleaned = text::clean_fragment(&element.inner_html());
    if cleaned.is_empty() {
        element
            .value()
            .attr("content")
            .map(text::clean_fragment)
            .unwrap_or_default()
    } else {
        cleaned
    }
}

/// Every description frame URL in the raw page, in pattern order then
/// document order, without duplicates.
///
/// Escaped separators (`\/`, `\u002F`) and `&amp;` are undone, and
/// relative references are resolved against `page_url`.
pub fn discover_subdocument_urls(html: &str, page_url: Option<&str>) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for pattern in SUBDOCUMENT_PATTERNS.iter() {
        let found = pattern
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| normalize_subdocument_url(m.as_str(), page_url));
        for url in found {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    urls
}

fn normalize_subdocument_url(raw: &str, page_url: Option<&str>) -> Option<String> {
    let unescaped = text::decode_entities(
        &raw.replace(r"\/", "/")
            .replace(r"\u002F", "/")
            .replace(r"\u002f", "/"),
    );
    let unescaped = unescaped.trim();

    if unescaped.starts_with("//") {
        return Some(format!("https:{unescaped}"));
    }
    match Url::parse(unescaped) {
        Ok(url) => Some(url.to_string()),
        Err(_) => page_url
            .and_then(|base| Url::parse(base).ok())
            .and_then(|base| base.join(unescaped).ok())
            .map(|url| url.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;

    const DESC_URL: &str = "https://vi.vipr.ebaydesc.com/itmdesc/123?t=0";

    fn resolver(mock: &MockFetcher) -> DescriptionResolver {
        DescriptionResolver::new(
            Arc::new(mock.clone()),
            SourceAllowlist::new(),
            ExtractionConfig::default(),
        )
    }

    #[test]
    fn test_inline_selector_table() {
        let mock = MockFetcher::new();
        let html = r#"<div id="desc_div"><p>Lightly worn wool coat,</p> <p>no stains &amp; no holes.</p>
            <script>var x = 1;</script></div>"#;
        let document = Html::parse_document(html);
        let resolution = resolver(&mock).inline_stage(&document, html, None);

        assert_eq!(
            resolution.inline.as_deref(),
            Some("Lightly worn wool coat, no stains & no holes.")
        );
        assert!(resolution.subdocument_url.is_none());
    }

    #[test]
    fn test_short_inline_text_is_noise() {
        let mock = MockFetcher::new();
        let html = r#"<div class="item-description">Too short</div>"#;
        let document = Html::parse_document(html);
        assert!(resolver(&mock).inline_stage(&document, html, None).inline.is_none());
    }

    #[test]
    fn test_description_heading_section() {
        let mock = MockFetcher::new();
        let html = "<h3>Item Description</h3><p>Vintage band tee from 1994, single stitch.</p><h3>Shipping</h3><p>Ships fast from a smoke-free home</p>";
        let document = Html::parse_document(html);
        let resolution = resolver(&mock).inline_stage(&document, html, None);
        assert_eq!(
            resolution.inline.as_deref(),
            Some("Vintage band tee from 1994, single stitch.")
        );
    }

    #[test]
    fn test_discover_subdocument_url_variants() {
        let html = r#"<iframe id="desc_ifr" src="https://vi.vipr.ebaydesc.com/itmdesc/123?t=0&amp;x=1"></iframe>"#;
        assert_eq!(
            discover_subdocument_urls(html, None).first().map(String::as_str),
            Some("https://vi.vipr.ebaydesc.com/itmdesc/123?t=0&x=1")
        );

        let html = r#"<script>{"descriptionUrl":"https:\/\/vi.vipr.ebaydesc.com/itmdesc\/9"}</script>"#;
        assert_eq!(
            discover_subdocument_urls(html, None).first().map(String::as_str),
            Some("https://vi.vipr.ebaydesc.com/itmdesc/9")
        );

        let html = r#"<iframe src="//vi.vipr.ebaydesc.com/itmdesc/5"></iframe>"#;
        assert_eq!(
            discover_subdocument_urls(html, None).first().map(String::as_str),
            Some("https://vi.vipr.ebaydesc.com/itmdesc/5")
        );

        let html = r#"<iframe id="descFrame" src="/desc/77"></iframe>"#;
        assert_eq!(
            discover_subdocument_urls(html, Some("https://www.etsy.com/listing/77")).first().map(String::as_str),
            Some("https://www.etsy.com/desc/77")
        );

        assert!(discover_subdocument_urls("<iframe src=\"https://ads.example/x\"></iframe>", None).is_empty());
    }

    #[tokio::test]
    async fn test_longer_subdocument_wins() {
        let long_text = "Hand-knit merino sweater. ".repeat(20);
        let mock = MockFetcher::new().with_html(DESC_URL, format!("<html><body><p>{long_text}</p></body></html>"));
        let html = format!(
            r#"<div class="item-description">Nice coat</div><iframe id="desc_ifr" src="{DESC_URL}"></iframe>"#
        );

        let resolution = resolver(&mock).resolve(&html, None).await;
        assert!(resolution.inline.is_none());
        assert!(resolution.subdocument_error.is_none());

        let (description, source) = resolution.into_best().unwrap();
        assert_eq!(description, long_text.trim());
        assert_eq!(source, FieldSource::SubDocument);
        assert_eq!(mock.fetch_calls(), vec![DESC_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_subdocument_failure_is_recorded_not_raised() {
        let mock = MockFetcher::new().with_status(DESC_URL, 500, "upstream down");
        let html = format!(
            r#"<div id="desc_div">A short but meaningful note</div><iframe src="{DESC_URL}"></iframe>"#
        );

        let resolution = resolver(&mock).resolve(&html, None).await;
        assert_eq!(resolution.subdocument_error.as_ref().map(|e| e.status()), Some(500));

        let (description, source) = resolution.into_best().unwrap();
        assert_eq!(description, "A short but meaningful note");
        assert_eq!(source, FieldSource::PagePattern);
    }

    #[tokio::test]
    async fn test_sufficient_inline_skips_subdocument() {
        let mock = MockFetcher::new();
        let html = format!(
            r#"<div id="desc_div">{}</div><iframe src="{DESC_URL}"></iframe>"#,
            "Plenty of detail about fit, fabric and wear. ".repeat(3)
        );

        let resolution = resolver(&mock).resolve(&html, None).await;
        assert!(!resolution.needs_subdocument());
        assert_eq!(mock.fetch_call_count(), 0);
    }

    #[test]
    fn test_rejected_frame_does_not_hide_later_frames() {
        let mock = MockFetcher::new();
        let html = r#"<iframe id="descAd" src="https://ads.example.com/frame"></iframe>
            <iframe id="desc_ifr" src="https://www.ebay.com/desc/9"></iframe>"#;
        let document = Html::parse_document(html);

        assert_eq!(
            discover_subdocument_urls(html, None),
            vec![
                "https://ads.example.com/frame".to_string(),
                "https://www.ebay.com/desc/9".to_string(),
            ]
        );
        let resolution = resolver(&mock).inline_stage(&document, html, None);
        assert_eq!(
            resolution.subdocument_url.as_deref(),
            Some("https://www.ebay.com/desc/9")
        );
    }

    #[test]
    fn test_frames_on_unknown_hosts_are_not_fetched() {
        let mock = MockFetcher::new();
        let html = r#"<iframe id="desc_ifr" src="https://tracker.example.com/desc"></iframe>"#;
        let document = Html::parse_document(html);
        let resolution = resolver(&mock).inline_stage(&document, html, None);
        assert!(resolution.subdocument_url.is_none());
    }
}
