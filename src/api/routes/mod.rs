//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`tasks`] - Task creation, status and URL submission
//! - [`archives`] - Archive delivery
//! - [`system`] - Health, OpenAPI, fallback

use serde::{Deserialize, Serialize};

mod archives;
mod system;
mod tasks;

// Re-export all handlers so `routes::function_name` works from the router
pub use archives::*;
pub use system::*;
pub use tasks::*;

/// Response for POST /tasks
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateTaskResponse {
    /// Identifier of the new task
    pub id: crate::types::TaskId,
}
