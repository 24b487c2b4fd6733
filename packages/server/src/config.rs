use anyhow::{Context, Result};
use dotenvy::dotenv;
use listing_extraction::{SecretString, SourceAllowlist};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Enables `render=true` requests when present
    pub rendering_proxy_api_key: Option<SecretString>,
    pub rendering_proxy_url: Option<String>,
    pub render_wait_ms: u64,
    pub fetch_timeout: Duration,
    pub request_timeout: Duration,
    /// Marketplaces allowed on top of the built-in list
    pub extra_marketplace_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rendering_proxy_api_key: None,
            rendering_proxy_url: None,
            render_wait_ms: 3000,
            fetch_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(90),
            extra_marketplace_domains: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            rendering_proxy_api_key: non_empty_var("RENDERING_PROXY_API_KEY").map(SecretString::from),
            rendering_proxy_url: non_empty_var("RENDERING_PROXY_URL"),
            render_wait_ms: env::var("RENDER_WAIT_MS")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("RENDER_WAIT_MS must be a number of milliseconds")?,
            fetch_timeout: Duration::from_secs(
                env::var("FETCH_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("FETCH_TIMEOUT_SECS must be a number of seconds")?,
            ),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "90".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ),
            extra_marketplace_domains: parse_domain_list(
                &env::var("EXTRA_MARKETPLACE_DOMAINS").unwrap_or_default(),
            ),
        })
    }

    /// Built-in marketplaces plus `extra_marketplace_domains`.
    pub fn allowlist(&self) -> SourceAllowlist {
        self.extra_marketplace_domains
            .iter()
            .fold(SourceAllowlist::new(), |list, domain| list.allow_domain(domain))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma separated list, dropping blanks.
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}
