//! Constants for the fetch module (page size, spooling, timeouts, throttling).

use std::time::Duration;

/// Number of documents requested per search page.
pub const PER_PAGE: u64 = 900;

/// In-memory threshold for spooled asset bodies (1 MiB); larger bodies spill to disk.
pub const SPOOL_MEMORY_THRESHOLD: usize = 1024 * 1024;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.documentcloud.org";

/// Path of the search endpoint relative to the base URL.
pub const SEARCH_PATH: &str = "/api/search.json";

/// Default minimum spacing between search requests.
pub const DEFAULT_SEARCH_INTERVAL: Duration = Duration::from_secs(1);

/// Default minimum spacing between asset downloads.
pub const DEFAULT_ASSET_INTERVAL: Duration = Duration::from_millis(100);

/// Largest interval accepted for either limiter.
pub const MAX_RATE_INTERVAL: Duration = Duration::from_secs(60);

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large assets).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Warning threshold for cumulative rate limit delay per limiter (30 seconds).
pub const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(30);
