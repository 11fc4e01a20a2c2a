//! Core downloader implementation split into focused submodules.
//!
//! The `ArchiveDownloader` struct and its methods are organized by domain:
//! - [`tasks`] - Task creation, URL submission, status and archive lookup
//! - [`pipeline`] - Background fetch-and-archive execution
//! - [`lifecycle`] - API server spawning and shutdown drain

mod lifecycle;
mod pipeline;
mod tasks;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::archive::ArchivePolicy;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::TaskRegistry;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

/// Background pipeline bookkeeping
#[derive(Clone)]
pub(crate) struct PipelineState {
    /// Tracks every spawned pipeline so shutdown can wait for them
    pub(crate) tracker: TaskTracker,
    /// Limits how many pipelines fetch at once (respects max_concurrent_pipelines config)
    pub(crate) concurrent_limit: Arc<Semaphore>,
    /// Flag to indicate whether new work is accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct ArchiveDownloader {
    /// Task table shared with every pipeline
    /// Public for integration tests to inspect task state
    pub registry: TaskRegistry,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// HTTP client used for every remote fetch (carries the fetch timeout)
    pub(crate) http: reqwest::Client,
    /// How unreadable local files are treated while archiving
    pub(crate) archive_policy: ArchivePolicy,
    /// Background pipeline bookkeeping
    pub(crate) pipelines: PipelineState,
}

impl ArchiveDownloader {
    /// Create a new downloader.
    ///
    /// Normalises the configuration, creates the temp-storage directory if
    /// missing and builds the HTTP client used by every pipeline.
    pub async fn new(config: Config) -> Result<Self> {
        let config = config.normalized();

        tokio::fs::create_dir_all(&config.temp_folder)
            .await
            .map_err(|e| Error::storage(&config.temp_folder, format!("can't create folder: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {}", e),
                key: Some("fetch_timeout".to_string()),
            })?;

        tracing::info!(
            temp_folder = %config.temp_folder.display(),
            file_types = ?config.file_types,
            max_active_tasks = config.max_active_tasks,
            "downloader initialized"
        );

        Ok(Self {
            registry: TaskRegistry::new(config.max_active_tasks),
            archive_policy: ArchivePolicy {
                best_effort: config.best_effort_archive,
            },
            pipelines: PipelineState {
                tracker: TaskTracker::new(),
                concurrent_limit: Arc::new(Semaphore::new(config.max_concurrent_pipelines)),
                accepting_new: Arc::new(AtomicBool::new(true)),
            },
            http,
            config: Arc::new(config),
        })
    }

    /// Effective (normalised) configuration
    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Number of pipelines spawned and not yet finished
    pub fn running_pipelines(&self) -> usize {
        self.pipelines.tracker.len()
    }
}
