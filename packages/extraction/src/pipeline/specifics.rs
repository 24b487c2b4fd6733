//! Item specifics (key/value attributes such as Size or Brand).
//!
//! Two passes, both applied:
//! 1. a generic label/value scan over the parsed document using sibling
//!    adjacency;
//! 2. targeted patterns for a fixed attribute vocabulary, only for keys
//!    the first pass did not find.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::text;
use crate::types::listing::{FieldSource, PartialListing};

const MAX_LABEL_CHARS: usize = 25;
const MAX_VALUE_CHARS: usize = 100;

/// Labels that belong to dedicated fields, never to specifics.
const RESERVED_LABELS: &[&str] = &["condition", "price", "title"];

/// Attributes looked up by name when the generic scan missed them.
pub const SPECIFICS_VOCABULARY: &[&str] = &[
    "Size",
    "Brand",
    "Color",
    "Material",
    "Style",
    "Type",
    "Pattern",
    "Sleeve Length",
    "Fit",
    "Department",
];

/// Class names that mark an element as a label without a trailing colon.
const LABEL_CLASSES: &[&str] = &[
    "ux-labels-values__labels",
    "attrLabels",
    "item-specifics-label",
    "attribute-label",
];

lazy_static! {
    static ref CANDIDATE_LABEL_SELECTOR: Selector = Selector::parse(
        "dt, th, td, span, b, strong, label, div.ux-labels-values__labels, div.attrLabels, \
         .item-specifics-label, .attribute-label"
    )
    .unwrap();

    static ref NAV_LABEL_REGEX: Regex = Regex::new(r"(?i)^(?:see|view|read|show|more|less)\b").unwrap();
    static ref NAV_VALUE_REGEX: Regex = Regex::new(r"(?i)^(?:see|view|read|show)\b").unwrap();

    static ref VOCABULARY_PATTERNS: Vec<(&'static str, Vec<Regex>)> = SPECIFICS_VOCABULARY
        .iter()
        .map(|key| (*key, vocabulary_patterns(key)))
        .collect();
}

/// Patterns for one vocabulary key: JSON name/value pairs, then a
/// `Key:` label followed by a value element.
fn vocabulary_patterns(key: &str) -> Vec<Regex> {
    let key = regex::escape(key).replace(' ', r"\s+");
    vec![
        Regex::new(&format!(
            r#"(?i)"(?:name|label|key)"\s*:\s*"{key}"\s*,\s*"values?"\s*:\s*\[?\s*"([^"]{{1,100}})""#
        ))
        .unwrap(),
        Regex::new(&format!(
            r"(?is)>\s*{key}\s*:\s*(?:</[a-z0-9]+\s*>\s*)*(?:<[a-z0-9]+\b[^>]*>\s*)*([^<>]{{1,100}}?)\s*<"
        ))
        .unwrap(),
    ]
}

/// Run both passes and add what they find to `listing`.
pub fn extract_specifics(document: &Html, html: &str, listing: &mut PartialListing) {
    let before = listing.specifics.len();

    for (label, value) in scan_label_value_pairs(document) {
        listing.fill_specific(label, value, FieldSource::PagePattern);
    }
    let generic = listing.specifics.len() - before;

    for (key, patterns) in VOCABULARY_PATTERNS.iter() {
        if listing.specifics.contains_key(*key) {
            continue;
        }
        let found = patterns.iter().find_map(|pattern| {
            pattern
                .captures_iter(html)
                .filter_map(|caps| caps.get(1))
                .map(|m| text::clean_fragment(m.as_str()))
                .find(|value| is_acceptable_value(value))
        });
        if let Some(value) = found {
            listing.fill_specific(*key, value, FieldSource::PagePattern);
        }
    }

    debug!(
        generic,
        targeted = listing.specifics.len() - before - generic,
        "Specifics scan complete"
    );
}

/// Generic label/value pairs in document order.
///
/// A label is a `dt`/`th` or a known label class, or any small inline
/// element whose text ends with a colon. The value is the next sibling
/// carrying text.
pub fn scan_label_value_pairs(document: &Html) -> Vec<(String, String)> {
    document
        .select(&CANDIDATE_LABEL_SELECTOR)
        .filter_map(|element| {
            let raw_label = text::collapse_whitespace(&element.text().collect::<String>());
            let strong = is_strong_label(&element);
            if !strong && !raw_label.ends_with(':') {
                return None;
            }

            let label = raw_label.trim_end_matches(':').trim().to_string();
            if !is_acceptable_label(&label) {
                return None;
            }

            let value = sibling_value(&element)?;
            is_acceptable_value(&value).then_some((label, value))
        })
        .collect()
}

fn is_strong_label(element: &ElementRef<'_>) -> bool {
    let el = element.value();
    matches!(el.name(), "dt" | "th")
        || el
            .attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| LABEL_CLASSES.contains(&c)))
}

/// Text of the first following sibling (element or bare text) that has any.
fn sibling_value(element: &ElementRef<'_>) -> Option<String> {
    for sibling in element.next_siblings() {
        let raw = match sibling.value() {
            Node::Text(t) => t.to_string(),
            Node::Element(el) => {
                // a header cell next to a header cell is a table header row
                if matches!(el.name(), "th" | "dt" | "script" | "style") {
                    return None;
                }
                ElementRef::wrap(sibling)?.text().collect::<String>()
            }
            _ => continue,
        };
        let value = text::collapse_whitespace(&raw);
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

fn is_acceptable_label(label: &str) -> bool {
    !label.is_empty()
        && text::char_len(label) <= MAX_LABEL_CHARS
        && !NAV_LABEL_REGEX.is_match(label)
        && !label.starts_with(|c: char| c.is_ascii_digit())
        && !RESERVED_LABELS.contains(&label.to_lowercase().as_str())
}

pub(crate) fn is_acceptable_value(value: &str) -> bool {
    !value.is_empty()
        && text::char_len(value) <= MAX_VALUE_CHARS
        && !NAV_VALUE_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> PartialListing {
        let mut listing = PartialListing::new();
        extract_specifics(&Html::parse_document(html), html, &mut listing);
        listing
    }

    #[test]
    fn test_definition_list_and_table() {
        let listing = extract(
            r#"<dl><dt>Size</dt><dd>M</dd><dt>Color</dt><dd> Navy  Blue </dd></dl>
            <table><tr><th>Material</th><td>Wool</td></tr></table>"#,
        );
        let pairs: Vec<_> = listing
            .specifics
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("Size", "M"), ("Color", "Navy Blue"), ("Material", "Wool")]
        );
    }

    #[test]
    fn test_marketplace_label_classes() {
        let listing = extract(
            r#"<div class="ux-layout-section__row">
                <div class="ux-labels-values__labels"><span class="ux-textspans">Brand</span></div>
                <div class="ux-labels-values__values"><span class="ux-textspans">Levi's</span></div>
            </div>"#,
        );
        assert_eq!(listing.specifics["Brand"], "Levi's");
        assert_eq!(
            listing.sources["specifics.Brand"],
            FieldSource::PagePattern
        );
    }

    #[test]
    fn test_colon_labels_with_text_values() {
        let listing = extract("<ul><li><b>Fit:</b> Slim</li><li><span>Inseam:</span><span>32</span></li></ul>");
        assert_eq!(listing.specifics["Fit"], "Slim");
        assert_eq!(listing.specifics["Inseam"], "32");
    }

    #[test]
    fn test_navigation_chrome_is_excluded() {
        let listing = extract(
            r#"<dl><dt>See More</dt><dd>Details</dd>
                <dt>Show all</dt><dd>Sizes</dd>
                <dt>2 left</dt><dd>Hurry</dd>
                <dt>Shipping</dt><dd>See details</dd></dl>"#,
        );
        assert!(listing.specifics.is_empty());
    }

    #[test]
    fn test_length_limits() {
        let long_value = "x".repeat(101);
        let html = format!(
            "<dl><dt>An extremely long label text here</dt><dd>v</dd><dt>Notes</dt><dd>{long_value}</dd></dl>"
        );
        assert!(extract(&html).specifics.is_empty());
    }

    #[test]
    fn test_reserved_labels_are_skipped() {
        let listing = extract("<dl><dt>Condition</dt><dd>Used</dd><dt>Price</dt><dd>$5</dd></dl>");
        assert!(listing.specifics.is_empty());
    }

    #[test]
    fn test_header_rows_are_not_pairs() {
        let listing = extract("<table><tr><th>Size</th><th>Chest</th></tr></table>");
        assert!(listing.specifics.is_empty());
    }

    #[test]
    fn test_targeted_vocabulary_fills_gaps() {
        let listing = extract(
            r#"<dl><dt>Size</dt><dd>L</dd></dl>
            <script>{"name":"Size","value":"XL"},{"name":"Sleeve Length","value":"Long Sleeve"}</script>
            <div><em>Department:</em> <a href="/men">Men</a></div>"#,
        );
        // generic pass wins for Size
        assert_eq!(listing.specifics["Size"], "L");
        assert_eq!(listing.specifics["Sleeve Length"], "Long Sleeve");
        assert_eq!(listing.specifics["Department"], "Men");
        assert_eq!(
            listing.specifics.keys().collect::<Vec<_>>(),
            vec!["Size", "Sleeve Length", "Department"]
        );
    }

    #[test]
    fn test_existing_specifics_are_kept() {
        let mut listing = PartialListing::new();
        listing.fill_specific("Brand", "Barbour", FieldSource::StructuredData);
        let html = "<dl><dt>Brand</dt><dd>Other</dd></dl>";
        extract_specifics(&Html::parse_document(html), html, &mut listing);

        assert_eq!(listing.specifics["Brand"], "Barbour");
        assert_eq!(
            listing.sources["specifics.Brand"],
            FieldSource::StructuredData
        );
    }
}
