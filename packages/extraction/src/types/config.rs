//! Configuration types for listing extraction.

use serde::{Deserialize, Serialize};

/// Tunables for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Longest description kept on the record, in characters.
    ///
    /// Longer text is cut silently and `description_truncated` is set.
    /// Default: 3000.
    pub max_description_chars: usize,

    /// Cleaned description text at or below this length is noise.
    ///
    /// Default: 20.
    pub min_description_chars: usize,

    /// Inline descriptions shorter than this trigger the sub-document lookup.
    ///
    /// Default: 50.
    pub sufficient_description_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_description_chars: 3000,
            min_description_chars: 20,
            sufficient_description_chars: 50,
        }
    }
}

impl ExtractionConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum retained description length.
    pub fn with_max_description_chars(mut self, chars: usize) -> Self {
        self.max_description_chars = chars;
        self
    }

    /// Set the length below which an inline description is not enough.
    pub fn with_sufficient_description_chars(mut self, chars: usize) -> Self {
        self.sufficient_description_chars = chars;
        self
    }
}

/// Per-request options chosen by the caller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Fetch through the JavaScript-rendering proxy instead of directly.
    #[serde(default)]
    pub use_rendering_proxy: bool,
}

impl ExtractOptions {
    pub fn direct() -> Self {
        Self {
            use_rendering_proxy: false,
        }
    }

    pub fn rendered() -> Self {
        Self {
            use_rendering_proxy: true,
        }
    }
}
