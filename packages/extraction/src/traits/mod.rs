//! Core trait abstractions for the listing extraction library.

pub mod fetcher;
