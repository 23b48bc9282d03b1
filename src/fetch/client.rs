//! Rate-limited client for the search and asset endpoints.
//!
//! This module provides the [`FetchClient`] struct, which gates every request
//! through the matching limiter of a [`RateLimiterPair`], issues it with the
//! bot's User-Agent, and either decodes a [`SearchResult`] or spools an asset
//! body into a [`SpooledBuffer`].

use std::io;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::constants::{PER_PAGE, SEARCH_PATH, SPOOL_MEMORY_THRESHOLD};
use super::error::FetchError;
use super::rate_limiter::RateLimiterPair;
use super::request::new_request;
use crate::config::{ConfigError, FetchConfig};
use crate::document::SearchResult;
use crate::spool::{SpooledBuffer, Spooler};

/// Rate-limited search and download client.
///
/// Cheap to clone; clones share the connection pool and both rate limiters,
/// so throttling holds across every task using the same client.
///
/// # Example
///
/// ```no_run
/// use dcbot_core::{FetchClient, FetchConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FetchClient::new(&FetchConfig::default())?;
/// let cancel = CancellationToken::new();
///
/// let page = client.search(&cancel, 1).await?;
/// for id in page.document_ids() {
///     println!("{id}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    base_url: String,
    gates: RateLimiterPair,
    spooler: Spooler,
}

impl FetchClient {
    /// Creates a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a setting is out of range or the HTTP
    /// transport cannot be built.
    #[instrument(skip_all, fields(base_url = %config.base_url))]
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = build_client(config.connect_timeout, config.read_timeout)
            .map_err(|source| ConfigError::HttpClient { source })?;
        debug!(
            search_interval_ms = config.search_interval.as_millis(),
            asset_interval_ms = config.asset_interval.as_millis(),
            "creating fetch client"
        );
        Ok(Self::with_parts(
            client,
            config.trimmed_base_url(),
            RateLimiterPair::new(config.search_interval, config.asset_interval),
            Spooler::new(config.spool_dir.clone()),
        ))
    }

    /// Creates a client from caller-supplied collaborators.
    ///
    /// `base_url` is used verbatim as the prefix of the search endpoint.
    #[must_use]
    pub fn with_parts(
        client: Client,
        base_url: impl Into<String>,
        gates: RateLimiterPair,
        spooler: Spooler,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            gates,
            spooler,
        }
    }

    /// URL of the search endpoint for `page`.
    #[must_use]
    pub fn search_url(&self, page: u64) -> String {
        format!(
            "{}{SEARCH_PATH}?per_page={PER_PAGE}&page={page}",
            self.base_url
        )
    }

    /// Fetches one page of document metadata.
    ///
    /// Waits on the search limiter first, then issues exactly one request.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Cancelled`] if `cancel` fires at any point
    /// - [`FetchError::SearchRequest`] on transport failure
    /// - [`FetchError::SearchStatus`] if the response is not `200 OK`
    /// - [`FetchError::SearchBody`] / [`FetchError::SearchDecode`] if the body
    ///   cannot be read or is not a search result
    /// - [`FetchError::OversizedPage`] if the page holds more than
    ///   [`PER_PAGE`] documents
    #[instrument(skip(self, cancel))]
    pub async fn search(
        &self,
        cancel: &CancellationToken,
        page: u64,
    ) -> Result<SearchResult, FetchError> {
        self.gates.search.acquire(cancel).await?;

        let url = self.search_url(page);
        let response = new_request(&url, cancel)
            .send(&self.client, |e| FetchError::search_request(&url, e))
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::search_status(status));
        }

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FetchError::Cancelled),
            body = response.bytes() => body.map_err(|source| FetchError::SearchBody { source })?,
        };
        let result: SearchResult =
            serde_json::from_slice(&body).map_err(|source| FetchError::SearchDecode { source })?;

        let count = result.documents.len();
        if u64::try_from(count).unwrap_or(u64::MAX) > PER_PAGE {
            return Err(FetchError::OversizedPage {
                count,
                limit: PER_PAGE,
            });
        }
        if result.page != page {
            debug!(
                requested = page,
                returned = result.page,
                "search returned a different page number"
            );
        }

        debug!(
            total = result.total,
            documents = count,
            "search page decoded"
        );
        Ok(result)
    }

    /// Downloads an asset into a fresh spooled buffer.
    ///
    /// Waits on the asset limiter first. The body is copied whatever the
    /// response status, so error pages are returned as content too. On
    /// success the buffer is rewound and owned by the caller, who must
    /// [`close`](SpooledBuffer::close) it; on failure it has already been
    /// released.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not an absolute URL.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Cancelled`] if `cancel` fires at any point
    /// - [`FetchError::AssetRequest`] on transport failure
    /// - [`FetchError::AssetRead`] if copying the body fails
    /// - [`FetchError::Seek`] if rewinding the buffer fails
    #[instrument(skip(self, cancel), fields(url = %url))]
    pub async fn download_file(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<(u64, SpooledBuffer), FetchError> {
        self.gates.asset.acquire(cancel).await?;

        let response = new_request(url, cancel)
            .send(&self.client, |e| FetchError::asset_request(url, e))
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(
                status = status.as_u16(),
                "asset responded with non-success status; spooling body anyway"
            );
        }

        let mut buffer = self.spooler.buffer(SPOOL_MEMORY_THRESHOLD);
        let copied = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            copied = copy_body(response, &mut buffer) => {
                copied.map_err(|e| FetchError::asset_read(url, e))
            }
        };
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(e) => {
                release(buffer);
                return Err(e);
            }
        };

        if let Err(source) = buffer.rewind().await {
            release(buffer);
            return Err(FetchError::Seek { source });
        }

        info!(bytes, spilled = buffer.is_spilled(), "asset downloaded");
        Ok((bytes, buffer))
    }
}

/// Streams the response body into `buffer`, returning bytes copied.
async fn copy_body(response: Response, buffer: &mut SpooledBuffer) -> io::Result<u64> {
    let mut stream = response.bytes_stream();
    let mut copied: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(io::Error::other)?;
        buffer.write_all(&chunk).await?;
        copied += chunk.len() as u64;
    }

    Ok(copied)
}

/// Releases a buffer on an error path; a failed cleanup is only logged.
fn release(buffer: SpooledBuffer) {
    if let Err(e) = buffer.close() {
        warn!(error = %e, "failed to remove spool file");
    }
}

fn build_client(
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(read_timeout)
        .gzip(true)
        .build()
}
