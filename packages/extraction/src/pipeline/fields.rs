//! Title, price and condition recovery.
//!
//! Runs the strategy tables for every single-valued field that the
//! structured-data pass left empty, and owns the validators the tables use.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::strategies::{
    PageText, StrategyTable, CONDITION_STRATEGIES, PRICE_STRATEGIES, TITLE_STRATEGIES,
};
use crate::types::listing::{Field, FieldSource, PartialListing};

/// Prices must fall strictly inside this range (US dollars).
pub const MAX_PRICE: u32 = 50_000;

const MAX_TITLE_CHARS: usize = 300;
const MAX_CONDITION_CHARS: usize = 80;

/// Site names stripped from the end of page titles.
const KNOWN_SITE_NAMES: &[&str] = &[
    "ebay", "poshmark", "depop", "mercari", "grailed", "vinted", "etsy", "thredup",
];

/// Words that mark an icon-text span as a condition.
const CONDITION_VOCABULARY: &[&str] = &[
    "new",
    "pre-owned",
    "preowned",
    "used",
    "refurbished",
    "open box",
    "for parts",
    "nwt",
    "nwot",
];

lazy_static! {
    static ref PRICE_NUMBER_REGEX: Regex = Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").unwrap();

    // " | Site" or " - Site" at the very end
    static ref SITE_SUFFIX_REGEX: Regex = Regex::new(r"\s+([|\-–—])\s+([^|\-–—]+?)\s*$").unwrap();

    static ref FOR_SALE_SUFFIX_REGEX: Regex = Regex::new(r"(?i)\s+for\s+sale(?:\s+online)?\s*$").unwrap();
}

/// Fill title, price and condition from pattern strategies.
///
/// Fields already set by a higher-confidence source are left untouched.
pub fn extract_fields(page: &PageText<'_>, listing: &mut PartialListing) {
    let tables: [(Field, &StrategyTable); 3] = [
        (Field::Title, &TITLE_STRATEGIES),
        (Field::Price, &PRICE_STRATEGIES),
        (Field::Condition, &CONDITION_STRATEGIES),
    ];

    for (field, table) in tables {
        if listing.has(field) {
            continue;
        }
        if let Some(candidate) = table.first_match(page) {
            listing.fill(field, candidate.value, FieldSource::PagePattern);
        }
    }
}

/// Validate and clean a title candidate.
pub fn title_value(raw: &str) -> Option<String> {
    let title = strip_site_suffix(raw.trim());
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return None;
    }
    Some(title)
}

/// Remove a trailing marketplace name such as `" | eBay"`.
///
/// Known marketplace names are always stripped. Unknown suffixes are only
/// stripped after a pipe and when they look like a bare site name: one
/// word, no digits.
pub fn strip_site_suffix(title: &str) -> String {
    let mut title = title.trim().to_string();

    if let Some(caps) = SITE_SUFFIX_REGEX.captures(&title) {
        let suffix = caps[2].trim();
        let start = caps.get(0).map(|m| m.start()).unwrap_or(title.len());
        let strip = is_known_site(suffix) || (&caps[1] == "|" && looks_like_site_name(suffix));
        if strip && start > 0 {
            title.truncate(start);
        }
    }

    FOR_SALE_SUFFIX_REGEX.replace(&title, "").trim().to_string()
}

fn is_known_site(suffix: &str) -> bool {
    let lower = suffix.to_lowercase();
    KNOWN_SITE_NAMES.iter().any(|name| {
        lower == *name
            || lower
                .strip_prefix(*name)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

fn looks_like_site_name(suffix: &str) -> bool {
    !suffix.contains(char::is_whitespace)
        && !suffix.chars().any(|c| c.is_ascii_digit())
        && suffix.chars().next().is_some_and(|c| c.is_alphabetic())
        && suffix.chars().count() <= 30
}

/// Validate and normalize a price candidate.
///
/// Thousands separators are removed and the amount must satisfy
/// `0 < value < 50000`. The currency symbol is never kept.
pub fn price_value(raw: &str) -> Option<String> {
    let number = PRICE_NUMBER_REGEX.find(raw)?.as_str().replace(',', "");
    let amount = Decimal::from_str(&number).ok()?;
    if amount <= Decimal::ZERO || amount >= Decimal::from(MAX_PRICE) {
        return None;
    }
    Some(number)
}

/// Validate and normalize a condition candidate.
///
/// schema.org condition URLs collapse to their short name:
/// `https://schema.org/UsedCondition` becomes `Used`.
pub fn condition_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let condition = match raw.rsplit_once("schema.org/") {
        Some((_, name)) => {
            let name = name.trim_end_matches('/');
            name.strip_suffix("Condition").unwrap_or(name).to_string()
        }
        None => raw.trim_end_matches([':', '.']).trim().to_string(),
    };

    let looks_like_markup = condition.contains(['{', '}', '<', '>', '"']) || condition.contains("://");
    if condition.is_empty() || looks_like_markup || condition.chars().count() > MAX_CONDITION_CHARS {
        return None;
    }
    Some(condition)
}

/// Like [`condition_value`] but also requires a known condition word.
pub fn condition_vocabulary_value(raw: &str) -> Option<String> {
    let condition = condition_value(raw)?;
    let lower = condition.to_lowercase();
    CONDITION_VOCABULARY
        .iter()
        .any(|word| lower.contains(word))
        .then_some(condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> PartialListing {
        let mut listing = PartialListing::new();
        extract_fields(&PageText::new(html), &mut listing);
        listing
    }

    #[test]
    fn test_title_from_og_with_site_suffix() {
        let listing = run(r#"<meta property="og:title" content="Vintage Levi's 501 | MarketSite">"#);
        assert_eq!(listing.title.as_deref(), Some("Vintage Levi's 501"));
    }

    #[test]
    fn test_title_fallbacks() {
        let listing = run(r#"<h1 class="x-item-title__mainTitle"><span>Patagonia  Fleece</span></h1>"#);
        assert_eq!(listing.title.as_deref(), Some("Patagonia Fleece"));

        let listing = run("<title>Nike Hoodie Size L for sale online | eBay</title>");
        assert_eq!(listing.title.as_deref(), Some("Nike Hoodie Size L"));
    }

    #[test]
    fn test_site_suffix_keeps_meaningful_tails() {
        assert_eq!(strip_site_suffix("Levi's 501 | Size 32"), "Levi's 501 | Size 32");
        assert_eq!(strip_site_suffix("Wool Coat - Depop"), "Wool Coat");
        assert_eq!(strip_site_suffix("Wool Coat | ebay.com"), "Wool Coat");
        assert_eq!(strip_site_suffix("Nike Air Max - Black"), "Nike Air Max - Black");
        assert_eq!(strip_site_suffix("| eBay"), "| eBay");
    }

    #[test]
    fn test_price_strategies() {
        let listing = run(r#"<span itemprop="price" content="45.00">$45.00</span>"#);
        assert_eq!(listing.price.as_deref(), Some("45.00"));

        let listing = run(r#"<script>{"price":"1,250.00","priceCurrency":"USD"}</script>"#);
        assert_eq!(listing.price.as_deref(), Some("1250.00"));

        let listing = run(r#"<script>{"currency":"USD","value":89.5}</script>"#);
        assert_eq!(listing.price.as_deref(), Some("89.5"));

        let listing = run("<p>Buy it now for $12.99 plus shipping</p>");
        assert_eq!(listing.price.as_deref(), Some("12.99"));
    }

    #[test]
    fn test_price_sanity_bound() {
        let listing = run("<p>Item $3,400,221</p>");
        assert!(listing.price.is_none());

        assert_eq!(price_value("0.00"), None);
        assert_eq!(price_value("50000"), None);
        assert_eq!(price_value("49,999.99").as_deref(), Some("49999.99"));
        assert_eq!(price_value("USD 18"), Some("18".to_string()));
        assert_eq!(price_value("free"), None);
    }

    #[test]
    fn test_condition_strategies() {
        let listing = run(r#"<script>{"conditionDisplayName":"New with tags"}</script>"#);
        assert_eq!(listing.condition.as_deref(), Some("New with tags"));

        let listing = run(r#"<div><span class="label">Condition:</span> <span class="value">Gently used</span></div>"#);
        assert_eq!(listing.condition.as_deref(), Some("Gently used"));

        let listing = run(r#"<link itemprop="itemCondition" href="https://schema.org/UsedCondition">"#);
        assert_eq!(listing.condition.as_deref(), Some("Used"));

        let listing = run(r#"<span class="ux-icon-text__text"><span class="clipped">Pre-owned</span></span>"#);
        assert_eq!(listing.condition.as_deref(), Some("Pre-owned"));
    }

    #[test]
    fn test_icon_text_requires_condition_vocabulary() {
        let listing = run(r#"<span class="ux-icon-text__text">Free shipping</span>"#);
        assert!(listing.condition.is_none());
    }

    #[test]
    fn test_existing_fields_are_not_overwritten() {
        let mut listing = PartialListing::new();
        listing.fill(Field::Title, "From JSON-LD", FieldSource::StructuredData);

        extract_fields(
            &PageText::new(r#"<meta property="og:title" content="Other">"#),
            &mut listing,
        );

        assert_eq!(listing.title.as_deref(), Some("From JSON-LD"));
        assert_eq!(listing.sources["title"], FieldSource::StructuredData);
    }
}
