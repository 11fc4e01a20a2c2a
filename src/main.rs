//! archive-dl server binary
//!
//! Loads `config.json` (or the file given with `--config`), serves the REST
//! API and drains running pipelines on SIGINT/SIGTERM.

use archive_dl::{ArchiveDownloader, Config};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Fetch remote files and bundle them into ZIP archives over HTTP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Override the listen port from the configuration file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let downloader = Arc::new(ArchiveDownloader::new(config).await?);
    let config = downloader.config();

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "starting archive-dl");

    archive_dl::api::serve(
        listener,
        downloader.clone(),
        config,
        archive_dl::shutdown_signal(),
    )
    .await?;

    downloader.shutdown().await?;
    Ok(())
}
