//! Data types for listing extraction.

pub mod config;
pub mod listing;
