//! Rate-limited fetch core for the document-hosting API.
//!
//! This module provides the [`FetchClient`], which retrieves paginated search
//! results and downloads individual document assets. Each operation first
//! waits on its own [`RequestGate`], then performs a single HTTP exchange that
//! aborts promptly when the caller's cancellation token fires.
//!
//! # Features
//!
//! - Independent throttles for search and asset traffic
//! - Cancellation at every suspension point (gate wait, request, body copy)
//! - Asset bodies spooled to memory, or to disk above 1 MiB
//! - Structured error types naming the failing stage
//!
//! # Example
//!
//! ```no_run
//! use dcbot_core::fetch::FetchClient;
//! use dcbot_core::FetchConfig;
//! use tokio::io::AsyncReadExt;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FetchClient::new(&FetchConfig::default())?;
//! let cancel = CancellationToken::new();
//!
//! let (bytes, mut buffer) = client
//!     .download_file(&cancel, "https://assets.example.org/doc.pdf")
//!     .await?;
//! let mut contents = Vec::with_capacity(usize::try_from(bytes)?);
//! buffer.read_to_end(&mut contents).await?;
//! buffer.close()?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
pub mod rate_limiter;
pub mod request;

pub use client::FetchClient;
pub use constants::{PER_PAGE, SPOOL_MEMORY_THRESHOLD};
pub use error::{FailureKind, FetchError};
pub use rate_limiter::{RateLimiter, RateLimiterPair, RequestGate};
pub use request::{ContextRequest, new_request};

// Note: per project convention, no module-local Result alias.
// Use `Result<T, FetchError>` explicitly in function signatures.
