//! In-memory task registry and admission control.
//!
//! The registry is the sole owner of every [`Task`]. All reads and writes go
//! through one exclusive lock, so readers always see a whole record and the
//! admission check is atomic with the insert it guards.

use crate::error::{Error, Result};
use crate::types::{Task, TaskId, TaskStatus, TaskView};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Shared task table (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<HashMap<TaskId, Task>>>,
    sequence: Arc<AtomicU64>,
    max_active: usize,
}

impl TaskRegistry {
    /// Create an empty registry admitting at most `max_active` waiting or
    /// in-progress tasks.
    pub fn new(max_active: usize) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
            max_active,
        }
    }

    /// Admission ceiling
    pub fn max_active(&self) -> usize {
        self.max_active
    }

    /// Create a waiting task, or fail with [`Error::Busy`] if the ceiling is
    /// reached. Nothing is inserted on failure.
    pub async fn create(&self) -> Result<TaskId> {
        let mut tasks = self.tasks.lock().await;

        let active = tasks.values().filter(|t| t.status.is_active()).count();
        if active >= self.max_active {
            tracing::debug!(active, limit = self.max_active, "admission refused");
            return Err(Error::Busy {
                active,
                limit: self.max_active,
            });
        }

        let now = Utc::now();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = TaskId(format!("{}-{}", now.format("%Y%m%d%H%M%S"), seq));
        tasks.insert(id.clone(), Task::new(id.clone(), now));

        tracing::info!(task_id = %id, active = active + 1, "task created");
        Ok(id)
    }

    /// Snapshot of a task
    pub async fn get(&self, id: &TaskId) -> Result<TaskView> {
        let tasks = self.tasks.lock().await;
        tasks
            .get(id)
            .map(Task::view)
            .ok_or_else(|| Error::NotFound("task missing".to_string()))
    }

    /// Check that URLs may be submitted to `id` without changing anything.
    pub async fn ensure_submittable(&self, id: &TaskId) -> Result<()> {
        let tasks = self.tasks.lock().await;
        let task = tasks
            .get(id)
            .ok_or_else(|| Error::NotFound("task missing".to_string()))?;
        check_submittable(task)
    }

    /// Move a waiting task to in-progress.
    ///
    /// Only a `Waiting` task can be started, so at most one pipeline ever
    /// runs per task id.
    pub async fn begin(&self, id: &TaskId) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| Error::NotFound("task missing".to_string()))?;
        check_submittable(task)?;
        task.status = TaskStatus::InProgress;
        Ok(())
    }

    /// Record the local files of an in-progress task. Write-once.
    pub async fn record_files(&self, id: &TaskId, files: Vec<PathBuf>) -> Result<()> {
        self.with_in_progress(id, |task| {
            if !task.files.is_empty() {
                return Err(Error::Conflict("task files already recorded".to_string()));
            }
            task.files = files;
            Ok(())
        })
        .await
    }

    /// Mark an in-progress task done with its archive path.
    pub async fn complete(&self, id: &TaskId, archive: PathBuf) -> Result<()> {
        self.with_in_progress(id, |task| {
            task.status = TaskStatus::Done;
            task.archive = Some(archive);
            Ok(())
        })
        .await
    }

    /// Mark an in-progress task failed with a message.
    pub async fn fail(&self, id: &TaskId, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.with_in_progress(id, |task| {
            task.status = TaskStatus::Failed;
            task.error = Some(message);
            Ok(())
        })
        .await
    }

    /// Number of tasks currently waiting or in progress
    pub async fn active_count(&self) -> usize {
        let tasks = self.tasks.lock().await;
        tasks.values().filter(|t| t.status.is_active()).count()
    }

    /// Total number of tasks
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Whether the registry holds no tasks
    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    async fn with_in_progress<F>(&self, id: &TaskId, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Task) -> Result<()>,
    {
        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| Error::NotFound("task missing".to_string()))?;
        if task.status != TaskStatus::InProgress {
            return Err(Error::Conflict(format!(
                "task {} is {}, expected in_progress",
                id, task.status
            )));
        }
        mutate(task)
    }
}

fn check_submittable(task: &Task) -> Result<()> {
    match task.status {
        TaskStatus::Waiting => Ok(()),
        TaskStatus::InProgress => Err(Error::Conflict("task already in progress".to_string())),
        TaskStatus::Done => Err(Error::Conflict("task already done".to_string())),
        TaskStatus::Failed => Err(Error::Conflict("task already failed".to_string())),
    }
}
