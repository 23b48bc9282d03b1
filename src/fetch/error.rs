//! Error types for the fetch module.
//!
//! Every recoverable failure of [`FetchClient`](super::FetchClient) is a
//! [`FetchError`] naming the stage that failed and carrying the underlying
//! cause. [`FetchError::kind`] folds the variants into the five failure
//! categories callers usually branch on.

use thiserror::Error;

/// Errors that can occur while searching or downloading.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The caller's cancellation token fired before the operation finished.
    #[error("operation cancelled")]
    Cancelled,

    /// Transport failure (DNS, connection refused, timeout) issuing a search.
    #[error("search request failed for {url}: {source}")]
    SearchRequest {
        /// The search URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The search endpoint answered with a non-success status.
    #[error("search result returned {status}: {reason}")]
    SearchStatus {
        /// The HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The search page held more documents than were requested.
    #[error("search result holds {count} documents, more than the page size of {limit}")]
    OversizedPage {
        /// Number of documents in the decoded page.
        count: usize,
        /// Requested page size.
        limit: u64,
    },

    /// The search response body could not be read off the wire.
    #[error("failed reading search result: {source}")]
    SearchBody {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The search response body was not a well-formed search result.
    #[error("failed reading search result: {source}")]
    SearchDecode {
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Transport failure issuing an asset download.
    #[error("asset request failed for {url}: {source}")]
    AssetRequest {
        /// The asset URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Copying the asset body into the spooled buffer failed.
    #[error("failed reading asset {url}: {source}")]
    AssetRead {
        /// The asset URL being copied.
        url: String,
        /// The underlying read or write error.
        #[source]
        source: std::io::Error,
    },

    /// Rewinding the spooled buffer failed.
    #[error("failed seeking: {source}")]
    Seek {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Coarse failure category for a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller cancelled the operation.
    Cancellation,
    /// Network-level failure talking to the API.
    Transport,
    /// The API answered, but not with what the protocol allows.
    Protocol,
    /// A response body could not be decoded.
    Decode,
    /// Writing to or seeking the spooled buffer failed.
    Io,
}

impl FetchError {
    /// Creates a search transport error.
    pub fn search_request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::SearchRequest {
            url: url.into(),
            source,
        }
    }

    /// Creates a search status error from a response status.
    pub fn search_status(status: reqwest::StatusCode) -> Self {
        Self::SearchStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        }
    }

    /// Creates an asset transport error.
    pub fn asset_request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::AssetRequest {
            url: url.into(),
            source,
        }
    }

    /// Creates an asset copy error.
    pub fn asset_read(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::AssetRead {
            url: url.into(),
            source,
        }
    }

    /// Returns the failure category of this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Cancelled => FailureKind::Cancellation,
            Self::SearchRequest { .. } | Self::SearchBody { .. } | Self::AssetRequest { .. } => {
                FailureKind::Transport
            }
            Self::SearchStatus { .. } | Self::OversizedPage { .. } => FailureKind::Protocol,
            Self::SearchDecode { .. } => FailureKind::Decode,
            Self::AssetRead { .. } | Self::Seek { .. } => FailureKind::Io,
        }
    }

    /// Returns whether this error is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// No `From<reqwest::Error>` or `From<std::io::Error>`: the same source type maps
// to different stages (search vs. asset), so callers pick the constructor.
