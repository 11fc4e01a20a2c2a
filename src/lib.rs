//! # archive-dl
//!
//! HTTP service that fetches batches of remote files and bundles them into a
//! single ZIP archive per task.
//!
//! ## Task lifecycle
//!
//! 1. `POST /tasks` creates a waiting task, unless too many tasks are already
//!    waiting or in progress.
//! 2. `POST /tasks/{id}/files` screens a JSON array of URLs against the
//!    allowed extensions, moves the task to in-progress and schedules a
//!    background pipeline.
//! 3. The pipeline fetches every accepted URL in order, then writes
//!    `<id>.zip` into the temp-storage folder. The first failed fetch fails
//!    the task.
//! 4. `GET /tasks/{id}` reports progress; `GET /archives/{id}.zip` serves the
//!    result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use archive_dl::{ArchiveDownloader, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ArchiveDownloader::new(Config::default()).await?;
//!
//!     let id = downloader.create_task().await?;
//!     let receipt = downloader
//!         .submit_files(&id, &["https://example.com/report.pdf".to_string()])
//!         .await?;
//!     println!("{}", receipt.message);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// ZIP archive assembly
pub mod archive;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// URL extension screening
pub mod filter;
/// In-memory task registry and admission control
pub mod registry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use archive::{ArchiveBuilder, ArchivePolicy};
pub use config::Config;
pub use downloader::ArchiveDownloader;
pub use error::{ApiError, Error, Result, ToHttpStatus};
pub use filter::{FilterOutcome, filter_urls};
pub use registry::TaskRegistry;
pub use types::{ArchiveReport, SubmitReceipt, Task, TaskId, TaskStatus, TaskView};

/// Resolve when the process receives a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn shutdown_signal() {
    wait_for_signal().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
