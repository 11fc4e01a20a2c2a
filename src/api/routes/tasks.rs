//! Task handlers.

use super::CreateTaskResponse;
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{SubmitReceipt, TaskId, TaskView};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

/// POST /tasks - Create a task
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    responses(
        (status = 201, description = "Task created", body = CreateTaskResponse),
        (status = 429, description = "Admission ceiling reached", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateTaskResponse>)> {
    let id = state.downloader.create_task().await?;
    Ok((StatusCode::CREATED, Json(CreateTaskResponse { id })))
}

/// GET /tasks/:id - Get task status
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task snapshot", body = TaskView),
        (status = 404, description = "Task not found", body = crate::error::ApiError)
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskView>> {
    let view = state.downloader.task_status(&TaskId::from(id)).await?;
    Ok(Json(view))
}

/// POST /tasks/:id/files - Submit URLs to a waiting task
///
/// The body is read raw and parsed as a JSON array regardless of the
/// request's content type.
#[utoipa::path(
    post,
    path = "/tasks/{id}/files",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    request_body(content = Vec<String>, description = "URLs to fetch", content_type = "application/json"),
    responses(
        (status = 201, description = "Pipeline scheduled", body = SubmitReceipt),
        (status = 400, description = "Missing, empty or malformed body", body = crate::error::ApiError),
        (status = 404, description = "Task not found", body = crate::error::ApiError),
        (status = 409, description = "Task is not waiting", body = crate::error::ApiError),
        (status = 415, description = "No URL has an allowed extension", body = crate::error::ApiError)
    )
)]
pub async fn submit_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitReceipt>)> {
    let id = TaskId::from(id);

    // Lookup and state errors take precedence over body errors
    state.downloader.registry.ensure_submittable(&id).await?;

    let urls = parse_url_list(&body)?;
    let receipt = state.downloader.submit_files(&id, &urls).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

fn parse_url_list(body: &[u8]) -> Result<Vec<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Validation("empty".to_string()));
    }
    serde_json::from_slice(body).map_err(|_| Error::Validation("invalid format".to_string()))
}
