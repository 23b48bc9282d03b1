//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use url::Url;

use dcbot_core::FetchConfig;
use dcbot_core::fetch::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, READ_TIMEOUT_SECS};

/// Rate-limited search and asset fetcher for a document-hosting API.
///
/// Fetches one page of search metadata or downloads one asset, honoring
/// separate request intervals for search and asset traffic.
#[derive(Parser, Debug)]
#[command(name = "dcbot")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Minimum delay between search requests in milliseconds (0 to disable, max 60000)
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub search_interval_ms: u64,

    /// Minimum delay between asset downloads in milliseconds (0 to disable, max 60000)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub asset_interval_ms: u64,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout_secs: u64,

    /// HTTP request timeout in seconds, including the body (1-3600)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout_secs: u64,

    /// Directory for spooling assets larger than 1 MiB (defaults to the system temp dir)
    #[arg(long)]
    pub spool_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations the binary can run.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one page of search results and print its document ids
    Search {
        /// Page number to fetch (1-based)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
    },

    /// Download one asset to a file or stdout
    Download {
        /// Absolute URL of the asset
        url: Url,

        /// Write the asset here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Args {
    /// Resolves the flags into core configuration.
    #[must_use]
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            base_url: self.base_url.clone(),
            search_interval: Duration::from_millis(self.search_interval_ms),
            asset_interval: Duration::from_millis(self.asset_interval_ms),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            spool_dir: self.spool_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_search_defaults_parse_successfully() {
        let args = Args::try_parse_from(["dcbot", "search"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.base_url, DEFAULT_BASE_URL);
        assert_eq!(args.search_interval_ms, 1000);
        assert_eq!(args.asset_interval_ms, 100);
        assert!(matches!(args.command, Command::Search { page: 1 }));
    }

    #[test]
    fn test_cli_search_page_flag() {
        let args = Args::try_parse_from(["dcbot", "search", "--page", "42"]).unwrap();
        assert!(matches!(args.command, Command::Search { page: 42 }));
    }

    #[test]
    fn test_cli_search_page_zero_rejected() {
        let result = Args::try_parse_from(["dcbot", "search", "--page", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_download_requires_valid_url() {
        let result = Args::try_parse_from(["dcbot", "download", "not a url"]);
        assert!(result.is_err());

        let args =
            Args::try_parse_from(["dcbot", "download", "https://example.com/a.pdf", "-o", "a.pdf"])
                .unwrap();
        match args.command {
            Command::Download { url, output } => {
                assert_eq!(url.as_str(), "https://example.com/a.pdf");
                assert_eq!(output, Some(PathBuf::from("a.pdf")));
            }
            other => panic!("expected download, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_verbose_flag_after_subcommand() {
        let args = Args::try_parse_from(["dcbot", "search", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_interval_out_of_range_rejected() {
        let result = Args::try_parse_from(["dcbot", "--search-interval-ms", "60001", "search"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        let result = Args::try_parse_from(["dcbot"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_config_maps_flags() {
        let args = Args::try_parse_from([
            "dcbot",
            "--base-url",
            "http://localhost:9999",
            "--search-interval-ms",
            "0",
            "--asset-interval-ms",
            "250",
            "--spool-dir",
            "/tmp/spool",
            "search",
        ])
        .unwrap();

        let config = args.fetch_config();
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.search_interval, Duration::ZERO);
        assert_eq!(config.asset_interval, Duration::from_millis(250));
        assert_eq!(config.spool_dir, Some(PathBuf::from("/tmp/spool")));
        assert!(config.validate().is_ok());
    }
}
