//! Marketplace allow-list.
//!
//! Every listing URL is checked here before any network call is made.

use std::collections::BTreeSet;
use url::Url;

use crate::error::{ExtractionError, Result};

/// Marketplaces whose listing pages the pipeline knows how to read.
pub const DEFAULT_MARKETPLACE_DOMAINS: &[&str] = &[
    "ebay.com",
    "ebay.co.uk",
    "ebay.ca",
    "ebay.com.au",
    "ebay.de",
    "poshmark.com",
    "depop.com",
    "mercari.com",
    "grailed.com",
    "vinted.com",
    "etsy.com",
    "thredup.com",
];

/// Hosts that serve seller descriptions in a separate frame.
pub const DESCRIPTION_HOST_DOMAINS: &[&str] = &["ebaydesc.com"];

/// Allow-list of registrable domains.
///
/// A host matches a domain exactly or as a subdomain of it:
/// `www.ebay.com` matches `ebay.com`, `notebay.com` does not.
#[derive(Debug, Clone)]
pub struct SourceAllowlist {
    /// Allowed URL schemes
    allowed_schemes: BTreeSet<String>,

    /// Allowed registrable domains (lowercase)
    domains: BTreeSet<String>,
}

impl Default for SourceAllowlist {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAllowlist {
    /// Allow-list with the default marketplaces.
    pub fn new() -> Self {
        Self::from_domains(DEFAULT_MARKETPLACE_DOMAINS.iter().copied())
    }

    /// Allow-list with exactly the given domains.
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            domains: domains
                .into_iter()
                .map(|d| normalize_domain(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// Add an allowed domain.
    pub fn allow_domain(mut self, domain: impl AsRef<str>) -> Self {
        let domain = normalize_domain(domain.as_ref());
        if !domain.is_empty() {
            self.domains.insert(domain);
        }
        self
    }

    /// Whether `host` is an allowed domain or one of its subdomains.
    pub fn allows_host(&self, host: &str) -> bool {
        host_matches(host, self.domains.iter().map(String::as_str))
    }

    /// Parse and check a listing URL.
    ///
    /// Unparsable, non-HTTP(S) or host-less URLs are `InvalidInput`.
    /// Parsable URLs on other hosts are `UnsupportedSource`.
    pub fn validate(&self, raw: &str) -> Result<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ExtractionError::invalid_input("url is empty"));
        }

        let parsed = Url::parse(raw)
            .map_err(|e| ExtractionError::invalid_input(format!("malformed url {raw:?}: {e}")))?;

        if !self.allowed_schemes.contains(parsed.scheme()) {
            return Err(ExtractionError::invalid_input(format!(
                "unsupported url scheme: {}",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ExtractionError::invalid_input("url has no host"))?;

        if !self.allows_host(host) {
            return Err(ExtractionError::UnsupportedSource {
                host: host.to_string(),
            });
        }

        Ok(parsed)
    }
}

/// Whether a URL points at a known description frame host.
pub fn is_description_host(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .and_then(|u| u.host_str().map(|h| host_matches(h, DESCRIPTION_HOST_DOMAINS.iter().copied())))
        .unwrap_or(false)
}

fn normalize_domain(domain: &str) -> String {
    domain
        .trim()
        .trim_start_matches("*.")
        .trim_start_matches('.')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn host_matches<'a>(host: &str, mut domains: impl Iterator<Item = &'a str>) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    domains.any(|domain| {
        host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
