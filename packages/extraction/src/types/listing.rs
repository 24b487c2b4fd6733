//! Listing record types - the output of the extraction pipeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a field value came from.
///
/// Variants are declared from most to least trusted, so `Ord` compares
/// confidence: `StructuredData < PagePattern < SubDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Embedded JSON-LD product annotations
    StructuredData,

    /// Pattern strategies run against the primary page
    PagePattern,

    /// Secondary fetch of the description frame
    SubDocument,
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StructuredData => "structured_data",
            Self::PagePattern => "page_pattern",
            Self::SubDocument => "sub_document",
        };
        f.write_str(name)
    }
}

/// Single-valued fields of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Price,
    Condition,
    Description,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Price, Field::Condition, Field::Description];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Price => "price",
            Self::Condition => "condition",
            Self::Description => "description",
        }
    }
}

/// Overall status of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Title, price, condition and description were all recovered.
    Complete,

    /// Some fields were recovered, others remain empty.
    ///
    /// This is an expected outcome, not an error. Check `missing_fields`.
    #[default]
    Partial,

    /// Nothing usable was recovered.
    Empty,
}

/// Working record with optional fields, filled in priority order.
///
/// Every write goes through [`PartialListing::fill`], which only sets a
/// field that is still empty. Running sources from most to least trusted
/// therefore guarantees a lower-confidence source never overwrites a
/// higher-confidence one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialListing {
    pub title: Option<String>,
    pub price: Option<String>,
    pub condition: Option<String>,
    pub specifics: IndexMap<String, String>,
    pub description: Option<String>,
    pub description_truncated: bool,
    pub sources: IndexMap<String, FieldSource>,
}

impl PartialListing {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Price => &mut self.price,
            Field::Condition => &mut self.condition,
            Field::Description => &mut self.description,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => self.title.as_deref(),
            Field::Price => self.price.as_deref(),
            Field::Condition => self.condition.as_deref(),
            Field::Description => self.description.as_deref(),
        }
    }

    pub fn has(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Set `field` to `value` if it is still empty.
    ///
    /// Values are trimmed; blank values are ignored. Returns whether the
    /// record changed.
    pub fn fill(&mut self, field: Field, value: impl AsRef<str>, source: FieldSource) -> bool {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return false;
        }
        let slot = self.slot(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.to_string());
        self.sources.insert(field.as_str().to_string(), source);
        true
    }

    /// Add an item specific unless the key is already present.
    ///
    /// Empty keys and empty values are never stored.
    pub fn fill_specific(
        &mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
        source: FieldSource,
    ) -> bool {
        let key = key.as_ref().trim();
        let value = value.as_ref().trim();
        if key.is_empty() || value.is_empty() || self.specifics.contains_key(key) {
            return false;
        }
        self.specifics.insert(key.to_string(), value.to_string());
        self.sources
            .entry(format!("specifics.{key}"))
            .or_insert(source);
        true
    }

    /// Empty a field and forget its source.
    pub fn clear(&mut self, field: Field) -> Option<String> {
        self.sources.shift_remove(field.as_str());
        self.slot(field).take()
    }

    /// Fold a lower-priority candidate into this record.
    pub fn merge(&mut self, other: PartialListing) {
        for field in Field::ALL {
            if let Some(value) = other.get(field) {
                let source = other
                    .sources
                    .get(field.as_str())
                    .copied()
                    .unwrap_or(FieldSource::PagePattern);
                self.fill(field, value, source);
            }
        }
        for (key, value) in &other.specifics {
            let source = other
                .sources
                .get(&format!("specifics.{key}"))
                .copied()
                .unwrap_or(FieldSource::PagePattern);
            self.fill_specific(key, value, source);
        }
    }

    /// Fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        Field::ALL
            .iter()
            .filter(|f| !self.has(**f))
            .map(|f| f.as_str())
            .collect()
    }

    pub fn status(&self) -> ExtractionStatus {
        let recovered = Field::ALL.iter().filter(|f| self.has(**f)).count();
        if recovered == Field::ALL.len() {
            ExtractionStatus::Complete
        } else if recovered == 0 && self.specifics.is_empty() {
            ExtractionStatus::Empty
        } else {
            ExtractionStatus::Partial
        }
    }

    /// Freeze into the public record, attaching a summary.
    pub fn into_record(self, url: Option<String>, summary: String) -> ListingRecord {
        let status = self.status();
        let missing_fields = self
            .missing_fields()
            .into_iter()
            .map(String::from)
            .collect();

        ListingRecord {
            url,
            title: self.title.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            condition: self.condition.unwrap_or_default(),
            specifics: self.specifics,
            description: self.description.unwrap_or_default(),
            description_truncated: self.description_truncated,
            summary,
            sources: self.sources,
            status,
            missing_fields,
        }
    }
}

/// A structured clothing listing, built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Listing URL, absent when the caller supplied raw HTML only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub title: String,

    /// Decimal amount without currency symbol or thousands separators
    pub price: String,

    pub condition: String,

    /// Item specifics in discovery order (Size, Brand, Color, ...)
    pub specifics: IndexMap<String, String>,

    /// Seller description, at most `max_description_chars` characters
    pub description: String,

    /// Set when the description was cut to fit
    pub description_truncated: bool,

    /// Human/LLM-readable composite of the fields above
    pub summary: String,

    /// Provenance of each populated field
    pub sources: IndexMap<String, FieldSource>,

    pub status: ExtractionStatus,

    pub missing_fields: Vec<String>,
}

impl ListingRecord {
    pub fn is_partial(&self) -> bool {
        self.status != ExtractionStatus::Complete
    }
}
