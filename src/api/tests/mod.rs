use super::*;
use crate::types::{TaskStatus, TaskView};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};


/// Helper to create a test router backed by a fresh downloader.
/// Returns the router, the downloader and the tempdir (which must be kept alive).
async fn create_test_app() -> (Router, Arc<ArchiveDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) = crate::downloader::test_helpers::create_test_downloader().await;
    let downloader = Arc::new(downloader);
    let app = create_router(downloader.clone(), downloader.config());
    (app, downloader, temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// POST /tasks and return the new id
async fn create_task_via_api(app: &Router) -> String {
    let response = send(app, post("/tasks", Body::empty())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["id"].as_str().unwrap().to_string()
}

/// Poll GET /tasks/:id until done or err
async fn poll_until_terminal(app: &Router, id: &str) -> TaskView {
    for _ in 0..500 {
        let response = send(app, get(&format!("/tasks/{id}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let view: TaskView = serde_json::from_slice(&body).unwrap();
        if view.status.is_terminal() {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("task {id} never finished");
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _temp_dir) = crate::downloader::test_helpers::create_test_downloader().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let downloader = Arc::new(downloader);
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(serve(listener, downloader.clone(), downloader.config(), async move {
        let _ = rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let (downloader, _temp_dir) =
        crate::downloader::test_helpers::create_test_downloader_with(|c| c.cors_enabled = true)
            .await;
    let downloader = Arc::new(downloader);
    let app = create_router(downloader.clone(), downloader.config());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled_by_default() {
    let (app, _downloader, _temp_dir) = create_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}
