//! Background fetch-and-archive execution.
//!
//! One pipeline runs per submitted task. URLs are fetched strictly in order;
//! the first failed fetch or write fails the whole task and no archive is
//! produced. Partially downloaded files are left in place.

use crate::archive::ArchiveBuilder;
use crate::error::{Error, Result};
use crate::filter::url_extension;
use crate::types::TaskId;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::task::task_tracker::TaskTrackerToken;

use super::ArchiveDownloader;

impl ArchiveDownloader {
    /// Spawn the pipeline for `id` on the tracked pool (fire and forget).
    ///
    /// `token` was taken from the tracker before the submission checked
    /// that work is still accepted, so a concurrent shutdown waits for this
    /// pipeline even if it is spawned after the tracker was closed.
    pub(crate) fn spawn_pipeline(&self, token: TaskTrackerToken, id: TaskId, urls: Vec<String>) {
        let downloader = self.clone();
        let limit = self.pipelines.concurrent_limit.clone();

        self.pipelines.tracker.spawn(async move {
            let _token = token;
            // Task stays in_progress while waiting for a permit
            let outcome = match limit.acquire_owned().await {
                Ok(_permit) => downloader.fetch_and_archive(&id, &urls).await,
                Err(_) => Err(Error::ShuttingDown),
            };
            downloader.record_outcome(&id, outcome).await;
        });
    }

    /// Log the pipeline outcome and record a failure on the task
    pub(crate) async fn record_outcome(&self, id: &TaskId, outcome: Result<PathBuf>) {
        match outcome {
            Ok(archive) => {
                tracing::info!(task_id = %id, archive = %archive.display(), "task done");
            }
            Err(e) => {
                tracing::error!(task_id = %id, error = %e, "error in task");
                if let Err(record_err) = self.registry.fail(id, e.to_string()).await {
                    tracing::warn!(task_id = %id, error = %record_err, "could not record failure");
                }
            }
        }
    }

    async fn fetch_and_archive(&self, id: &TaskId, urls: &[String]) -> Result<PathBuf> {
        tracing::info!(task_id = %id, count = urls.len(), "pipeline started");

        let mut local = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let path = self.local_file_path(id, index, url);
            self.fetch_to_file(url, &path).await?;
            local.push(path);
        }

        self.archive_task(id, local).await
    }

    /// Record the downloaded files, pack them into `<id>.zip` and mark the
    /// task done.
    pub(crate) async fn archive_task(&self, id: &TaskId, local: Vec<PathBuf>) -> Result<PathBuf> {
        self.registry.record_files(id, local.clone()).await?;

        let archive_path = self.config.temp_folder.join(format!("{}.zip", id));
        let builder = ArchiveBuilder::new(self.archive_policy);
        let target = archive_path.clone();
        // zip writing is blocking I/O
        let report = tokio::task::spawn_blocking(move || builder.build(&target, &local))
            .await
            .map_err(|e| Error::storage(&archive_path, format!("archive task failed: {}", e)))??;

        if !report.skipped.is_empty() {
            tracing::warn!(task_id = %id, skipped = ?report.skipped, "archive built without some files");
        }

        self.registry.complete(id, archive_path.clone()).await?;
        Ok(archive_path)
    }

    /// Download `url` into a new file at `path`.
    ///
    /// Non-success statuses and timeouts are transport errors. The file is
    /// created with create-new semantics, so an existing file is a storage
    /// error rather than being overwritten.
    pub(crate) async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<()> {
        tracing::debug!(url, path = %path.display(), "fetching");

        let mut response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::transport(url, format!("timed out after {:?}", self.config.fetch_timeout))
            } else {
                Error::transport(url, e)
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::transport(
                url,
                format!("HTTP status {}", response.status()),
            ));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| Error::storage(path, format!("can't create: {}", e)))?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| Error::transport(url, e))? {
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::storage(path, format!("can't save: {}", e)))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| Error::storage(path, format!("can't save: {}", e)))?;

        tracing::debug!(url, bytes = written, "fetched");
        Ok(())
    }

    /// `<temp>/<id>_<hhmmssmmm>_<index><ext>`, keeping the URL's extension case
    pub(crate) fn local_file_path(&self, id: &TaskId, index: usize, url: &str) -> PathBuf {
        let stamp = chrono::Local::now().format("%H%M%S%3f");
        self.config
            .temp_folder
            .join(format!("{}_{}_{}{}", id, stamp, index, url_extension(url)))
    }
}
