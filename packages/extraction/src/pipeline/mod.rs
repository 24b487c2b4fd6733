//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Structured data (JSON-LD) as the highest-confidence source
//! - Versioned strategy tables for title, price and condition
//! - Item specifics (generic label/value scan + targeted vocabulary)
//! - Two-stage description resolution (inline, then sub-document)
//! - Summary assembly

pub mod description;
pub mod extractor;
pub mod fields;
pub mod specifics;
pub mod strategies;
pub mod structured;
pub mod summary;

pub use description::{discover_subdocument_urls, DescriptionResolution, DescriptionResolver};
pub use extractor::ListingExtractor;
pub use fields::{condition_value, extract_fields, price_value, strip_site_suffix, title_value, MAX_PRICE};
pub use specifics::{extract_specifics, scan_label_value_pairs, SPECIFICS_VOCABULARY};
pub use strategies::{
    Candidate, PageText, Scope, Strategy, StrategyTable, CONDITION_STRATEGIES, PRICE_STRATEGIES,
    STRATEGY_VERSION, TITLE_STRATEGIES,
};
pub use structured::extract_structured;
pub use summary::{build_summary, MANUAL_ENTRY_FALLBACK, NO_DESCRIPTION_NOTE};
