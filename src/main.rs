//! CLI entry point for dcbot.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use dcbot_core::{FetchClient, SpooledBuffer};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries ids and asset bytes, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = args.fetch_config();
    let client = FetchClient::new(&config).context("Invalid fetch configuration")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    match args.command {
        Command::Search { page } => run_search(&client, &cancel, page).await,
        Command::Download { url, output } => {
            run_download(&client, &cancel, url.as_str(), output.as_deref()).await
        }
    }
}

async fn run_search(client: &FetchClient, cancel: &CancellationToken, page: u64) -> Result<()> {
    let result = client
        .search(cancel, page)
        .await
        .with_context(|| format!("Search for page {page} failed"))?;

    info!(
        total = result.total,
        page = result.page,
        pages = result.page_count(),
        documents = result.documents.len(),
        "search page fetched"
    );

    let mut stdout = std::io::stdout().lock();
    for id in result.document_ids() {
        writeln!(stdout, "{id}")?;
    }
    stdout.flush()?;
    Ok(())
}

async fn run_download(
    client: &FetchClient,
    cancel: &CancellationToken,
    url: &str,
    output: Option<&Path>,
) -> Result<()> {
    let (bytes, mut buffer) = client
        .download_file(cancel, url)
        .await
        .with_context(|| format!("Download of {url} failed"))?;

    let written = match output {
        Some(path) => save_to_file(&mut buffer, path)
            .await
            .with_context(|| format!("Failed to write asset to '{}'", path.display())),
        None => drain(&mut buffer, &mut tokio::io::stdout())
            .await
            .context("Failed to write asset to stdout"),
    };

    // Release the spool file whether or not the copy succeeded
    let closed = buffer.close().context("Failed to remove spool file");
    written?;
    closed?;

    info!(bytes, "asset saved");
    Ok(())
}

async fn save_to_file(buffer: &mut SpooledBuffer, path: &Path) -> std::io::Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    drain(buffer, &mut file).await
}

async fn drain<W>(buffer: &mut SpooledBuffer, writer: &mut W) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let copied = tokio::io::copy(buffer, writer).await?;
    writer.flush().await?;
    Ok(copied)
}
