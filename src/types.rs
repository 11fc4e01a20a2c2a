//! Core types for archive-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a task
///
/// Rendered as `<YYYYMMDDhhmmss>-<seq>`; see [`crate::registry::TaskRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task status
///
/// Transitions are one-directional: `Waiting -> InProgress -> Done | Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, no URLs submitted yet
    Waiting,
    /// Pipeline scheduled or running
    InProgress,
    /// Archive produced
    Done,
    /// Pipeline aborted with an error
    #[serde(rename = "err", alias = "failed")]
    Failed,
}

impl TaskStatus {
    /// Whether the task counts against the admission ceiling
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Waiting | TaskStatus::InProgress)
    }

    /// Whether the task has reached Done or Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Waiting => "waiting",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "err",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task record owned by the registry
#[derive(Clone, Debug)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Local paths of the downloaded files, set once all downloads succeed
    pub files: Vec<PathBuf>,
    /// Current status
    pub status: TaskStatus,
    /// Produced archive, set only when Done
    pub archive: Option<PathBuf>,
    /// Failure description, set only when Failed
    pub error: Option<String>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new waiting task
    pub fn new(id: TaskId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            files: Vec::new(),
            status: TaskStatus::Waiting,
            archive: None,
            error: None,
            created_at,
        }
    }

    /// External representation of this task
    pub fn view(&self) -> TaskView {
        TaskView {
            id: self.id.clone(),
            files: self
                .files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            status: self.status,
            archive: self
                .archive
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            err: self.error.clone(),
            created: self.created_at,
        }
    }
}

/// Read-only snapshot of a task returned by `GET /tasks/{id}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskView {
    /// Task identifier
    pub id: TaskId,
    /// Local file paths (empty until every download succeeded)
    pub files: Vec<String>,
    /// Current status
    pub status: TaskStatus,
    /// Path of the produced archive
    pub archive: Option<String>,
    /// Failure description
    pub err: Option<String>,
    /// Creation timestamp
    pub created: DateTime<Utc>,
}

/// Result of a successful URL submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitReceipt {
    /// Summary message, e.g. `files ok; skipped: .txt`
    pub message: String,
    /// Number of URLs handed to the pipeline
    #[serde(skip)]
    pub accepted: usize,
    /// Extensions of the skipped URLs
    #[serde(skip)]
    pub rejected: Vec<String>,
}

/// Summary of a finished archive
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Entry names written to the archive
    pub added: Vec<String>,
    /// Local files skipped under the best-effort policy
    pub skipped: Vec<PathBuf>,
}
