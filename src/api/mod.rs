//! REST API server module
//!
//! Thin HTTP transport over [`ArchiveDownloader`]: every handler delegates to
//! a downloader method and maps its error to a status code and JSON body.

use crate::{ArchiveDownloader, Config, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Tasks
/// - `POST /tasks` - Create a task (429 when the admission ceiling is reached)
/// - `GET /tasks/:id` - Get task status
/// - `POST /tasks/:id/files` - Submit a JSON array of URLs
///
/// ## Archives
/// - `GET /archives/:name` - Download a produced archive
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
///
/// Unknown paths get a JSON 404 and unsupported methods a JSON 405.
pub fn create_router(downloader: Arc<ArchiveDownloader>, config: Arc<Config>) -> Router {
    let state = AppState::new(downloader, config.clone());

    let router = Router::new()
        // Tasks
        .route(
            "/tasks",
            post(routes::create_task).fallback(routes::method_not_allowed),
        )
        .route(
            "/tasks/:id",
            get(routes::get_task).fallback(routes::method_not_allowed),
        )
        .route(
            "/tasks/:id/files",
            post(routes::submit_files).fallback(routes::method_not_allowed),
        )
        // Archives
        .route(
            "/archives/:name",
            get(routes::get_archive).fallback(routes::method_not_allowed),
        )
        // System
        .route(
            "/health",
            get(routes::health_check).fallback(routes::method_not_allowed),
        )
        .route(
            "/openapi.json",
            get(routes::openapi_spec).fallback(routes::method_not_allowed),
        )
        .fallback(routes::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Serve the API on an already bound listener until `shutdown` resolves.
///
/// In-flight requests are allowed to finish once `shutdown` fires.
/// Pipelines are not awaited here; call [`ArchiveDownloader::shutdown`]
/// afterwards for that.
pub async fn serve<F>(
    listener: TcpListener,
    downloader: Arc<ArchiveDownloader>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr().map_err(crate::error::Error::Io)?;
    tracing::info!(address = %address, "API server listening");

    let app = create_router(downloader, config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
