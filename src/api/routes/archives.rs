//! Archive delivery handler.

use crate::api::AppState;
use crate::error::{Error, Result};
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// GET /archives/:name - Download a produced archive
#[utoipa::path(
    get,
    path = "/archives/{name}",
    tag = "archives",
    params(
        ("name" = String, Path, description = "Archive file name, e.g. `<task id>.zip`")
    ),
    responses(
        (status = 200, description = "Archive contents (application/zip)"),
        (status = 404, description = "Archive not found", body = crate::error::ApiError)
    )
)]
pub async fn get_archive(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let path = state.downloader.archive_file(&name).await?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| Error::NotFound("archive is not found".to_string()))?;

    let content_type = if name.to_lowercase().ends_with(".zip") {
        "application/zip"
    } else {
        "application/octet-stream"
    };

    tracing::debug!(path = %path.display(), "serving archive");

    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
