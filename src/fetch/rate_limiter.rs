//! Request throttling for search and asset traffic.
//!
//! This module provides the [`RequestGate`] trait and its [`RateLimiter`]
//! implementation, which enforces a minimum interval between successive grants.
//! Search requests and asset downloads each get their own limiter (bundled in
//! [`RateLimiterPair`]), so a burst of downloads never delays a search and vice
//! versa.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use dcbot_core::fetch::{RateLimiter, RequestGate};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), dcbot_core::fetch::FetchError> {
//! let limiter = RateLimiter::new("search", Duration::from_secs(1));
//! let cancel = CancellationToken::new();
//!
//! // First grant is immediate
//! limiter.acquire(&cancel).await?;
//!
//! // Second grant waits until a second has passed since the first
//! limiter.acquire(&cancel).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::constants::CUMULATIVE_DELAY_WARNING_THRESHOLD;
use super::error::FetchError;

/// A timed gate that callers pass through before issuing a request.
///
/// `acquire` returns once the caller may proceed, or [`FetchError::Cancelled`]
/// if `cancel` fires first. A cancelled acquire never consumes a grant.
#[async_trait]
pub trait RequestGate: Send + Sync + std::fmt::Debug {
    /// Waits for the next grant.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cancelled`] if `cancel` fires before the grant.
    async fn acquire(&self, cancel: &CancellationToken) -> Result<(), FetchError>;
}

/// Minimum-interval rate limiter.
///
/// Holds a single "last grant" cursor behind a `tokio::sync::Mutex`. Waiters
/// keep the lock while they sleep, so grants are serialized in lock order
/// (FIFO) and never land closer together than the configured interval.
///
/// # Thread Safety
///
/// `RateLimiter` is `Send + Sync`; wrap it in `Arc` and share it across tasks.
#[derive(Debug)]
pub struct RateLimiter {
    /// Label used in log output ("search", "asset").
    name: &'static str,

    /// Minimum time between two grants.
    interval: Duration,

    /// Whether throttling is disabled (interval of zero).
    disabled: bool,

    /// Time of the previous grant.
    /// `None` until the first grant, which is immediate.
    last_grant: Mutex<Option<Instant>>,

    /// Total delay applied so far (in milliseconds).
    cumulative_delay_ms: AtomicU64,
}

impl RateLimiter {
    /// Creates a rate limiter that spaces grants by `interval`.
    ///
    /// An interval of zero yields a disabled limiter.
    #[must_use]
    #[instrument(skip_all, fields(limiter = name, interval_ms = interval.as_millis()))]
    pub fn new(name: &'static str, interval: Duration) -> Self {
        if interval.is_zero() {
            return Self::disabled(name);
        }
        debug!("creating rate limiter");
        Self {
            name,
            interval,
            disabled: false,
            last_grant: Mutex::new(None),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    /// Creates a disabled rate limiter that grants immediately.
    #[must_use]
    pub fn disabled(name: &'static str) -> Self {
        debug!(limiter = name, "creating disabled rate limiter");
        Self {
            name,
            interval: Duration::ZERO,
            disabled: true,
            last_grant: Mutex::new(None),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    /// Returns whether throttling is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the minimum interval between grants.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the log label of this limiter.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds to the cumulative delay and returns the new total.
    #[allow(clippy::cast_possible_truncation)]
    fn add_cumulative_delay(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as u64;
        let new_total = self
            .cumulative_delay_ms
            .fetch_add(delay_ms, Ordering::SeqCst)
            + delay_ms;
        Duration::from_millis(new_total)
    }
}

#[async_trait]
impl RequestGate for RateLimiter {
    #[instrument(level = "trace", skip_all, fields(limiter = self.name))]
    async fn acquire(&self, cancel: &CancellationToken) -> Result<(), FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        if self.disabled {
            return Ok(());
        }

        let mut last_grant = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FetchError::Cancelled),
            guard = self.last_grant.lock() => guard,
        };

        if let Some(previous) = *last_grant {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let delay = self.interval.saturating_sub(elapsed);
                debug!(
                    limiter = self.name,
                    delay_ms = delay.as_millis(),
                    "applying rate limit delay"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!(limiter = self.name, "cancelled while waiting for grant");
                        return Err(FetchError::Cancelled);
                    }
                    () = tokio::time::sleep(delay) => {}
                }

                let cumulative = self.add_cumulative_delay(delay);
                if cumulative >= CUMULATIVE_DELAY_WARNING_THRESHOLD {
                    warn!(
                        limiter = self.name,
                        cumulative_delay_secs = cumulative.as_secs(),
                        "excessive rate limiting - callers are issuing requests faster than the interval allows"
                    );
                }
            }
        } else {
            debug!(limiter = self.name, "first grant - no delay");
        }

        *last_grant = Some(Instant::now());
        Ok(())
    }
}

/// The two independent gates used by [`FetchClient`](super::FetchClient).
#[derive(Debug, Clone)]
pub struct RateLimiterPair {
    /// Gate for search requests.
    pub search: Arc<dyn RequestGate>,
    /// Gate for asset downloads.
    pub asset: Arc<dyn RequestGate>,
}

impl RateLimiterPair {
    /// Creates a pair of [`RateLimiter`]s with the given intervals.
    #[must_use]
    pub fn new(search_interval: Duration, asset_interval: Duration) -> Self {
        Self {
            search: Arc::new(RateLimiter::new("search", search_interval)),
            asset: Arc::new(RateLimiter::new("asset", asset_interval)),
        }
    }

    /// Creates a pair from caller-supplied gates.
    #[must_use]
    pub fn from_gates(search: Arc<dyn RequestGate>, asset: Arc<dyn RequestGate>) -> Self {
        Self { search, asset }
    }
}
