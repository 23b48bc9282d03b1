//! Resolved configuration for a [`FetchClient`](crate::fetch::FetchClient).
//!
//! The values here arrive already resolved (from flags, environment, or an
//! embedding application); this module only holds them and checks ranges.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::fetch::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_ASSET_INTERVAL, DEFAULT_BASE_URL, DEFAULT_SEARCH_INTERVAL,
    MAX_RATE_INTERVAL, READ_TIMEOUT_SECS,
};

/// Upper bound for either HTTP timeout.
const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// Configuration errors reported by [`FetchConfig::validate`] and
/// [`FetchClient::new`](crate::fetch::FetchClient::new).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL did not parse.
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// The parse error.
        #[source]
        source: url::ParseError,
    },

    /// The base URL is not http or https.
    #[error("unsupported base URL scheme {scheme:?} (expected http or https)")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },

    /// A rate limit interval is out of range.
    #[error("invalid `{field}`: {value_ms}ms. Expected range: 0..={max_ms}ms")]
    IntervalOutOfRange {
        /// Name of the setting.
        field: &'static str,
        /// Rejected value in milliseconds.
        value_ms: u128,
        /// Largest accepted value in milliseconds.
        max_ms: u128,
    },

    /// An HTTP timeout is out of range.
    #[error("invalid `{field}`: {value_secs}s. Expected range: 1..=3600s")]
    TimeoutOutOfRange {
        /// Name of the setting.
        field: &'static str,
        /// Rejected value in seconds.
        value_secs: u64,
    },

    /// The HTTP transport could not be built from the settings.
    #[error("failed to build HTTP client: {source}")]
    HttpClient {
        /// The builder error.
        #[source]
        source: reqwest::Error,
    },
}

/// Settings for the fetch core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// API base URL, without a trailing path.
    pub base_url: String,
    /// Minimum spacing between search requests; zero disables the limiter.
    pub search_interval: Duration,
    /// Minimum spacing between asset downloads; zero disables the limiter.
    pub asset_interval: Duration,
    /// HTTP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout, including reading the body.
    pub read_timeout: Duration,
    /// Directory for spooled assets larger than the memory threshold.
    pub spool_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_interval: DEFAULT_SEARCH_INTERVAL,
            asset_interval: DEFAULT_ASSET_INTERVAL,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            spool_dir: None,
        }
    }
}

impl FetchConfig {
    /// Checks every value against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        validate_interval("search_interval", self.search_interval)?;
        validate_interval("asset_interval", self.asset_interval)?;
        validate_timeout("connect_timeout", self.connect_timeout)?;
        validate_timeout("read_timeout", self.read_timeout)?;
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn validate_interval(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value > MAX_RATE_INTERVAL {
        return Err(ConfigError::IntervalOutOfRange {
            field,
            value_ms: value.as_millis(),
            max_ms: MAX_RATE_INTERVAL.as_millis(),
        });
    }
    Ok(())
}

fn validate_timeout(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value < Duration::from_secs(1) || value > MAX_TIMEOUT {
        return Err(ConfigError::TimeoutOutOfRange {
            field,
            value_secs: value.as_secs(),
        });
    }
    Ok(())
}
