//! Structured product data (JSON-LD) extraction.
//!
//! The highest-confidence source: values found here are written first and
//! nothing later in the pipeline can replace them.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use super::fields::price_value;
use super::specifics::is_acceptable_value;
use crate::text;
use crate::types::listing::{Field, FieldSource, PartialListing};

lazy_static! {
    static ref JSON_LD_SELECTOR: Selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
}

/// Parse every JSON-LD block in `document` into a partial listing.
///
/// For each field independently, the first qualifying block that carries
/// it wins. Unparsable blocks are skipped.
pub fn extract_structured(document: &Html) -> PartialListing {
    let mut listing = PartialListing::new();
    let mut parsed = 0usize;

    for (index, script) in document.select(&JSON_LD_SELECTOR).enumerate() {
        let raw = script.text().collect::<String>();
        if raw.trim().is_empty() {
            continue;
        }
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                warn!(block = index, error = %e, "Skipping unparsable JSON-LD block");
                continue;
            }
        };
        parsed += 1;

        for product in product_nodes(&value) {
            apply_product(product, &mut listing);
        }
    }

    debug!(
        blocks = parsed,
        fields = listing.sources.len(),
        "Structured data pass complete"
    );
    listing
}

/// Flatten a JSON-LD value into the objects that describe a product.
///
/// Handles a bare object, a top-level array, and `@graph` containers.
fn product_nodes(value: &Value) -> Vec<&Value> {
    let mut nodes = Vec::new();
    collect_nodes(value, &mut nodes);
    nodes.into_iter().filter(|node| is_product(node)).collect()
}

fn collect_nodes<'a>(value: &'a Value, nodes: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_nodes(item, nodes)),
        Value::Object(map) => {
            nodes.push(value);
            if let Some(graph) = map.get("@graph") {
                collect_nodes(graph, nodes);
            }
        }
        _ => {}
    }
}

/// A block qualifies if it declares a product type or simply has a name.
fn is_product(node: &Value) -> bool {
    let declares_product = match node.get("@type") {
        Some(Value::String(t)) => is_product_type(t),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(is_product_type),
        _ => false,
    };
    declares_product || node.get("name").and_then(Value::as_str).is_some()
}

fn is_product_type(t: &str) -> bool {
    matches!(
        t.rsplit('/').next().unwrap_or(t),
        "Product" | "ProductGroup" | "IndividualProduct" | "ProductModel"
    )
}

fn apply_product(product: &Value, listing: &mut PartialListing) {
    // declared names are kept as published, only trimmed
    if !listing.has(Field::Title) {
        if let Some(name) = product.get("name").and_then(Value::as_str) {
            listing.fill(Field::Title, text::decode_entities(name), FieldSource::StructuredData);
        }
    }

    if !listing.has(Field::Price) {
        if let Some(price) = offer_price(product) {
            listing.fill(Field::Price, price, FieldSource::StructuredData);
        }
    }

    if !listing.specifics.contains_key("Brand") {
        if let Some(brand) = brand_name(product) {
            listing.fill_specific("Brand", brand, FieldSource::StructuredData);
        }
    }

    if !listing.has(Field::Description) {
        if let Some(description) = string_field(product, "description") {
            listing.fill(
                Field::Description,
                text::clean_multiline(&description),
                FieldSource::StructuredData,
            );
        }
    }
}

/// String value of `key`, cleaned of markup and entities.
fn string_field(node: &Value, key: &str) -> Option<String> {
    let value = node.get(key)?.as_str()?;
    let cleaned = text::clean_fragment(value);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// `offers.price` (or `lowPrice`), where `offers` may be an object or array.
fn offer_price(product: &Value) -> Option<String> {
    let offers = product.get("offers")?;
    let candidates: Vec<&Value> = match offers {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    candidates.into_iter().find_map(|offer| {
        ["price", "lowPrice"].iter().find_map(|key| {
            let raw = match offer.get(*key)? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            price_value(&raw)
        })
    })
}

/// `brand.name`, or `brand` when it is a plain string.
///
/// Subject to the same value limits as any other specific.
fn brand_name(product: &Value) -> Option<String> {
    match product.get("brand")? {
        Value::String(s) => Some(text::clean_fragment(s)),
        Value::Object(_) => string_field(product.get("brand")?, "name"),
        Value::Array(items) => items.iter().find_map(|b| match b {
            Value::String(s) => Some(text::clean_fragment(s)),
            other => string_field(other, "name"),
        }),
        _ => None,
    }
    .filter(|b| is_acceptable_value(b))
}
