//! Shutdown coordination.

use crate::error::Result;
use std::sync::atomic::Ordering;

use super::ArchiveDownloader;

impl ArchiveDownloader {
    /// Gracefully shut down the downloader
    ///
    /// 1. Stops accepting task creation and URL submission
    /// 2. Waits for in-flight pipelines, bounded by `shutdown_timeout`
    ///
    /// Pipelines still running after the timeout are left to the runtime;
    /// their tasks stay `in_progress`.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.pipelines.accepting_new.store(false, Ordering::SeqCst);
        self.pipelines.tracker.close();
        tracing::info!(
            running = self.pipelines.tracker.len(),
            "Stopped accepting new tasks"
        );

        let wait_result =
            tokio::time::timeout(self.config.shutdown_timeout, self.pipelines.tracker.wait())
                .await;

        match wait_result {
            Ok(()) => tracing::info!("All pipelines completed"),
            Err(_) => tracing::warn!(
                running = self.pipelines.tracker.len(),
                "Timeout waiting for pipelines, proceeding with shutdown"
            ),
        }

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
