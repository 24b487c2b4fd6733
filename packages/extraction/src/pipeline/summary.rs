//! Summary text for downstream readers.

use crate::text;
use crate::types::listing::PartialListing;

/// Replaces the whole summary when neither title nor price was recovered.
pub const MANUAL_ENTRY_FALLBACK: &str =
    "Could not extract listing details from this page. Please paste the listing title, price and description manually.";

/// Appended when no meaningful seller description was found.
pub const NO_DESCRIPTION_NOTE: &str =
    "Note: No seller description was found. Some details may need to be entered manually.";

/// Build the human/LLM-readable summary of a listing.
///
/// Pure: depends only on `listing`. Descriptions at or below
/// `min_description_chars` count as absent.
pub fn build_summary(listing: &PartialListing, min_description_chars: usize) -> String {
    let title = non_empty(listing.title.as_deref());
    let price = non_empty(listing.price.as_deref());

    if title.is_none() && price.is_none() {
        return MANUAL_ENTRY_FALLBACK.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    if let Some(title) = title {
        lines.push(format!("Title: {title}"));
    }
    if let Some(price) = price {
        lines.push(format!("Price: ${price}"));
    }
    if let Some(condition) = non_empty(listing.condition.as_deref()) {
        lines.push(format!("Condition: {condition}"));
    }

    if !listing.specifics.is_empty() {
        lines.push(String::new());
        lines.push("Item Specifics:".to_string());
        lines.extend(listing.specifics.iter().map(|(k, v)| format!("{k}: {v}")));
    }

    lines.push(String::new());
    match non_empty(listing.description.as_deref())
        .filter(|d| text::char_len(d) > min_description_chars)
    {
        Some(description) => {
            lines.push("Seller Description:".to_string());
            lines.push(description.to_string());
        }
        None => lines.push(NO_DESCRIPTION_NOTE.to_string()),
    }

    lines.join("\n")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::listing::{Field, FieldSource};

    fn listing() -> PartialListing {
        let mut listing = PartialListing::new();
        listing.fill(Field::Title, "Vintage Levi's 501", FieldSource::PagePattern);
        listing.fill(Field::Price, "45.00", FieldSource::PagePattern);
        listing.fill(Field::Condition, "Pre-owned", FieldSource::PagePattern);
        listing
    }

    #[test]
    fn test_full_summary_layout() {
        let mut listing = listing();
        listing.fill_specific("Size", "32x34", FieldSource::PagePattern);
        listing.fill_specific("Brand", "Levi's", FieldSource::PagePattern);
        listing.fill(
            Field::Description,
            "Faded wash, no rips.\nMeasured flat.",
            FieldSource::PagePattern,
        );

        assert_eq!(
            build_summary(&listing, 20),
            "Title: Vintage Levi's 501\nPrice: $45.00\nCondition: Pre-owned\n\n\
             Item Specifics:\nSize: 32x34\nBrand: Levi's\n\n\
             Seller Description:\nFaded wash, no rips.\nMeasured flat."
        );
    }

    #[test]
    fn test_missing_description_note() {
        let summary = build_summary(&listing(), 20);
        assert!(summary.starts_with("Title: Vintage Levi's 501\nPrice: $45.00\nCondition: Pre-owned\n"));
        assert!(summary.ends_with(NO_DESCRIPTION_NOTE));
        assert!(!summary.contains("Seller Description:"));

        let mut short = listing();
        short.fill(Field::Description, "See photos", FieldSource::PagePattern);
        assert!(build_summary(&short, 20).ends_with(NO_DESCRIPTION_NOTE));
    }

    #[test]
    fn test_fallback_overrides_everything() {
        let mut listing = PartialListing::new();
        listing.fill(Field::Condition, "New", FieldSource::PagePattern);
        listing.fill_specific("Size", "M", FieldSource::PagePattern);
        listing.fill(
            Field::Description,
            "A long enough description of the item.",
            FieldSource::PagePattern,
        );

        assert_eq!(build_summary(&listing, 20), MANUAL_ENTRY_FALLBACK);
    }

    #[test]
    fn test_price_only_is_enough() {
        let mut listing = PartialListing::new();
        listing.fill(Field::Price, "12", FieldSource::PagePattern);
        assert!(build_summary(&listing, 20).starts_with("Price: $12\n"));
    }
}
