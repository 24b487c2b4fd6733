// Marketplace Listing Extraction - API Core
//
// HTTP surface over the listing-extraction library: one stateless
// extraction endpoint plus a raw-HTML variant and a health check.

pub mod config;
pub mod server;

pub use config::*;
