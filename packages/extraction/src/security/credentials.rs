//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate so the rendering proxy key never reaches logs.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

use crate::error::{ExtractionError, Result};

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Only call this when building the outbound request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Environment variable holding the rendering proxy key.
pub const RENDERING_PROXY_API_KEY_ENV: &str = "RENDERING_PROXY_API_KEY";

/// Read the rendering proxy key from the process environment.
///
/// A missing or blank value is `ConfigurationMissing`.
pub fn rendering_proxy_key_from_env() -> Result<SecretString> {
    std::env::var(RENDERING_PROXY_API_KEY_ENV)
        .ok()
        .map(SecretString::from)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            ExtractionError::ConfigurationMissing(format!(
                "{RENDERING_PROXY_API_KEY_ENV} must be set to use the rendering proxy"
            ))
        })
}
