//! Versioned strategy tables for single-valued fields.
//!
//! Each field owns an ordered table of `(pattern, refine)` pairs. The
//! first candidate, in table order and then document order, that refines
//! to `Some` wins. Supporting a new site quirk means adding one row here.
//!
//! Bump [`STRATEGY_VERSION`] whenever a table changes so extraction logs
//! can be correlated with the table generation that produced them.

use lazy_static::lazy_static;
use regex::Regex;
use std::cell::OnceCell;
use tracing::debug;

use super::fields::{condition_value, condition_vocabulary_value, price_value, title_value};
use crate::text;
use crate::types::listing::Field;

/// Generation of the tables below.
pub const STRATEGY_VERSION: u32 = 4;

/// Upper bound on matches inspected per strategy.
const MAX_MATCHES_PER_STRATEGY: usize = 25;

/// What a strategy's pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The raw HTML, markup included
    Html,
    /// Visible text only (scripts, styles and tags removed)
    VisibleText,
}

/// One pattern + validator pair.
pub struct Strategy {
    pub name: &'static str,
    pub scope: Scope,
    pattern: Regex,
    refine: fn(&str) -> Option<String>,
}

impl Strategy {
    fn new(
        name: &'static str,
        scope: Scope,
        pattern: &str,
        refine: fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            name,
            scope,
            pattern: Regex::new(pattern).unwrap(),
            refine,
        }
    }

    /// First match that survives refinement.
    ///
    /// The captured value is the first participating group, cleaned of
    /// markup and entities before `refine` sees it.
    fn apply(&self, haystack: &str) -> Option<String> {
        self.pattern
            .captures_iter(haystack)
            .take(MAX_MATCHES_PER_STRATEGY)
            .filter_map(|caps| {
                caps.iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .map(|m| text::clean_fragment(m.as_str()))
            })
            .find_map(|raw| (self.refine)(&raw))
    }
}

/// A page prepared for strategy matching.
///
/// Visible text is derived lazily, only when a `VisibleText` strategy runs.
pub struct PageText<'a> {
    html: &'a str,
    visible: OnceCell<String>,
}

impl<'a> PageText<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            visible: OnceCell::new(),
        }
    }

    pub fn html(&self) -> &'a str {
        self.html
    }

    pub fn visible(&self) -> &str {
        self.visible
            .get_or_init(|| text::collapse_whitespace(&text::decode_entities(&text::strip_tags(self.html))))
    }

    fn scoped(&self, scope: Scope) -> &str {
        match scope {
            Scope::Html => self.html,
            Scope::VisibleText => self.visible(),
        }
    }
}

/// A refined value and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub strategy: &'static str,
}

/// Ordered strategies for one field.
pub struct StrategyTable {
    pub field: Field,
    pub version: u32,
    pub strategies: Vec<Strategy>,
}

impl StrategyTable {
    /// Run strategies in order; first refined match wins.
    pub fn first_match(&self, page: &PageText<'_>) -> Option<Candidate> {
        self.strategies.iter().find_map(|strategy| {
            let value = strategy.apply(page.scoped(strategy.scope))?;
            debug!(
                field = self.field.as_str(),
                strategy = strategy.name,
                version = self.version,
                "Strategy matched"
            );
            Some(Candidate {
                value,
                strategy: strategy.name,
            })
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }
}

lazy_static! {
    pub static ref TITLE_STRATEGIES: StrategyTable = StrategyTable {
        field: Field::Title,
        version: STRATEGY_VERSION,
        strategies: vec![
            Strategy::new(
                "og_title",
                Scope::Html,
                r#"(?is)<meta\b[^>]*?[\s"'](?:property|name)\s*=\s*["']og:title["'][^>]*?[\s"']content\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
                title_value,
            ),
            Strategy::new(
                "og_title_content_first",
                Scope::Html,
                r#"(?is)<meta\b[^>]*?[\s"']content\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*?[\s"'](?:property|name)\s*=\s*["']og:title["']"#,
                title_value,
            ),
            Strategy::new(
                "twitter_title",
                Scope::Html,
                r#"(?is)<meta\b[^>]*?[\s"'](?:property|name)\s*=\s*["']twitter:title["'][^>]*?[\s"']content\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
                title_value,
            ),
            Strategy::new(
                "title_heading",
                Scope::Html,
                r#"(?is)<h1\b[^>]*?class\s*=\s*["'][^"']*(?:x-item-title|item-title|product-title|listing-title|it-ttl)[^"']*["'][^>]*>(.*?)</h1\s*>"#,
                title_value,
            ),
            Strategy::new(
                "document_title",
                Scope::Html,
                r"(?is)<title\b[^>]*>(.*?)</title\s*>",
                title_value,
            ),
        ],
    };

    pub static ref PRICE_STRATEGIES: StrategyTable = StrategyTable {
        field: Field::Price,
        version: STRATEGY_VERSION,
        strategies: vec![
            Strategy::new(
                "itemprop_price",
                Scope::Html,
                r#"(?is)<[a-z]+\b[^>]*?[\s"']itemprop\s*=\s*["']price["'][^>]*?[\s"']content\s*=\s*["']([^"']+)["']"#,
                price_value,
            ),
            Strategy::new(
                "itemprop_price_content_first",
                Scope::Html,
                r#"(?is)<[a-z]+\b[^>]*?[\s"']content\s*=\s*["']([^"']+)["'][^>]*?[\s"']itemprop\s*=\s*["']price["']"#,
                price_value,
            ),
            Strategy::new(
                "meta_price_amount",
                Scope::Html,
                r#"(?is)<meta\b[^>]*?[\s"'](?:property|name)\s*=\s*["'](?:product|og):price:amount["'][^>]*?[\s"']content\s*=\s*["']([^"']+)["']"#,
                price_value,
            ),
            Strategy::new(
                "json_price_then_usd",
                Scope::Html,
                r#"(?i)"(?:price|value)"\s*:\s*"?([0-9][0-9,]*(?:\.[0-9]+)?)"?\s*,\s*"(?:priceCurrency|currency|currencyCode)"\s*:\s*"USD""#,
                price_value,
            ),
            Strategy::new(
                "json_usd_then_price",
                Scope::Html,
                r#"(?i)"(?:priceCurrency|currency|currencyCode)"\s*:\s*"USD"\s*,\s*"(?:price|value)"\s*:\s*"?([0-9][0-9,]*(?:\.[0-9]+)?)"#,
                price_value,
            ),
            Strategy::new(
                "primary_price_container",
                Scope::Html,
                r#"(?is)<[a-z]+\b[^>]*?(?:class\s*=\s*["'][^"']*(?:x-price-primary|x-bin-price|display-price|product-price)[^"']*["']|id\s*=\s*["'](?:prcIsum|mm-saleDscPrc)["'])[^>]*>.{0,400}?\$\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)"#,
                price_value,
            ),
            Strategy::new(
                "dollar_amount",
                Scope::VisibleText,
                r"(?:US\s*)?\$\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)",
                price_value,
            ),
        ],
    };

    pub static ref CONDITION_STRATEGIES: StrategyTable = StrategyTable {
        field: Field::Condition,
        version: STRATEGY_VERSION,
        strategies: vec![
            Strategy::new(
                "json_condition_display",
                Scope::Html,
                r#"(?i)"(?:conditionDisplayName|conditionText|itemConditionText|condition_name)"\s*:\s*"([^"]{1,80})""#,
                condition_value,
            ),
            Strategy::new(
                "condition_label",
                Scope::Html,
                r"(?is)>\s*(?:Item\s+)?Condition\s*:\s*(?:</[a-z0-9]+\s*>\s*)*(?:<[a-z0-9]+\b[^>]*>\s*)*([^<>]{1,80}?)\s*<",
                condition_value,
            ),
            Strategy::new(
                "itemprop_condition",
                Scope::Html,
                r#"(?is)<[a-z]+\b[^>]*?[\s"']itemprop\s*=\s*["']itemCondition["'][^>]*?[\s"'](?:content|href)\s*=\s*["']([^"']+)["']"#,
                condition_value,
            ),
            Strategy::new(
                "itemprop_condition_text",
                Scope::Html,
                r#"(?is)<[a-z]+\b[^>]*?[\s"']itemprop\s*=\s*["']itemCondition["'][^>]*>([^<]{1,80})<"#,
                condition_value,
            ),
            Strategy::new(
                "condition_icon_text",
                Scope::Html,
                r#"(?is)<span\b[^>]*?class\s*=\s*["'][^"']*(?:ux-icon-text|condition)[^"']*["'][^>]*>(.*?)</span\s*>"#,
                condition_vocabulary_value,
            ),
        ],
    };
}
