//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the archive-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the archive-dl REST API
///
/// Served as JSON at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "archive-dl REST API",
        version = "0.1.0",
        description = "Create tasks, submit file URLs, poll status and download the produced ZIP archives",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::api::routes::create_task,
        crate::api::routes::get_task,
        crate::api::routes::submit_files,
        crate::api::routes::get_archive,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::TaskId,
            crate::types::TaskStatus,
            crate::types::TaskView,
            crate::types::SubmitReceipt,
            crate::api::routes::CreateTaskResponse,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "tasks", description = "Task lifecycle"),
        (name = "archives", description = "Archive delivery"),
        (name = "system", description = "Health and documentation")
    )
)]
pub struct ApiDoc;
