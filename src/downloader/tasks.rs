//! Task creation, URL submission, status and archive lookup.

use crate::error::{Error, Result};
use crate::filter::filter_urls;
use crate::types::{SubmitReceipt, TaskId, TaskView};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::Ordering;

use super::ArchiveDownloader;

impl ArchiveDownloader {
    /// Create a waiting task if the admission ceiling allows it.
    pub async fn create_task(&self) -> Result<TaskId> {
        self.ensure_accepting()?;
        self.registry.create().await
    }

    /// Submit URLs to a waiting task and schedule its pipeline.
    ///
    /// URLs whose extension is not allowed are skipped and reported in the
    /// receipt. The call returns as soon as the pipeline is scheduled.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the task does not exist
    /// - [`Error::Conflict`] unless the task is waiting
    /// - [`Error::Validation`] if `urls` is empty
    /// - [`Error::UnsupportedMediaType`] if no URL is allowed; the task is left unchanged
    pub async fn submit_files(&self, id: &TaskId, urls: &[String]) -> Result<SubmitReceipt> {
        // Held from before the accepting check until the pipeline finishes,
        // so shutdown cannot stop waiting in between.
        let token = self.pipelines.tracker.token();
        self.ensure_accepting()?;
        self.registry.ensure_submittable(id).await?;

        if urls.is_empty() {
            return Err(Error::Validation("empty".to_string()));
        }

        let outcome = filter_urls(urls, &self.config.file_types);
        if outcome.accepted.is_empty() {
            tracing::debug!(task_id = %id, rejected = ?outcome.rejected_extensions, "no allowed URLs");
            return Err(Error::UnsupportedMediaType {
                allowed: self.config.file_types.clone(),
                rejected: outcome.rejected_extensions,
            });
        }

        // Re-checks the state under the lock, so two racing submissions
        // cannot both start a pipeline.
        self.registry.begin(id).await?;

        let receipt = SubmitReceipt {
            message: outcome.summary(),
            accepted: outcome.accepted.len(),
            rejected: outcome.rejected_extensions,
        };

        tracing::info!(
            task_id = %id,
            accepted = receipt.accepted,
            skipped = receipt.rejected.len(),
            "files submitted"
        );

        self.spawn_pipeline(token, id.clone(), outcome.accepted);
        Ok(receipt)
    }

    /// Snapshot of a task
    pub async fn task_status(&self, id: &TaskId) -> Result<TaskView> {
        self.registry.get(id).await
    }

    /// Resolve an archive name to a file in the temp-storage directory.
    ///
    /// Only plain file names are accepted; anything with a directory
    /// component resolves to [`Error::NotFound`].
    pub async fn archive_file(&self, name: &str) -> Result<PathBuf> {
        let not_found = || Error::NotFound("archive is not found".to_string());

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(not_found()),
        }

        let path = self.config.temp_folder.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(not_found()),
        }
    }

    fn ensure_accepting(&self) -> Result<()> {
        if self.pipelines.accepting_new.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }
}
