//! Source validation and credential handling.

pub mod allowlist;
pub mod credentials;

pub use allowlist::{is_description_host, SourceAllowlist, DEFAULT_MARKETPLACE_DOMAINS};
pub use credentials::{rendering_proxy_key_from_env, SecretString, RENDERING_PROXY_API_KEY_ENV};
