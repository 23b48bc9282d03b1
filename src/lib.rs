//! DCBot Core Library
//!
//! This library is the fetch core of the dcbot crawler: a rate-limited client
//! for a document-hosting service's HTTP API that retrieves paginated search
//! metadata and downloads document assets into spooled buffers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Rate limiters, request building, and the [`FetchClient`]
//! - [`spool`] - Memory-then-disk buffers for downloaded asset bodies
//! - [`document`] - Search result pages and document id extraction
//! - [`config`] - Resolved configuration values and validation
//!
//! Deciding which pages and documents to fetch, and where assets end up,
//! belongs to the caller.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod document;
pub mod fetch;
pub mod spool;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, FetchConfig};
pub use document::{SearchResult, id_for_document};
pub use fetch::{
    FailureKind, FetchClient, FetchError, PER_PAGE, RateLimiter, RateLimiterPair, RequestGate,
    SPOOL_MEMORY_THRESHOLD,
};
pub use spool::{SpooledBuffer, Spooler};
