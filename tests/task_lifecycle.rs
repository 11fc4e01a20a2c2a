//! End-to-end tests over a real TCP listener.

mod common;

use archive_dl::TaskStatus;
use common::TestServer;
use std::io::Read;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JPEG_BYTES: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43];

async fn remote_files() -> MockServer {
    let server = MockServer::start().await;
    for (route, body) in [
        ("/a.pdf", b"%PDF-1.5 alpha".to_vec()),
        ("/b.jpeg", JPEG_BYTES.to_vec()),
        ("/c.pdf", b"%PDF-1.5 gamma".to_vec()),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn full_flow_produces_downloadable_archive() {
    let remote = remote_files().await;
    let server = TestServer::start().await;

    let id = server.create_task().await;
    let urls = vec![
        format!("{}/a.pdf", remote.uri()),
        format!("{}/b.jpeg", remote.uri()),
        format!("{}/notes.txt", remote.uri()),
        format!("{}/c.pdf", remote.uri()),
    ];

    let response = server
        .client
        .post(server.url(&format!("/tasks/{id}/files")))
        .json(&urls)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "files ok; skipped: .txt");

    let view = server.wait_for_terminal(&id).await;
    assert_eq!(view.status, TaskStatus::Done);
    assert_eq!(view.files.len(), 3);

    let archive = server
        .client
        .get(server.url(&format!("/archives/{id}.zip")))
        .send()
        .await
        .unwrap();
    assert_eq!(archive.status(), 200);
    let bytes = archive.bytes().await.unwrap();

    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(zip.len(), 3);
    let expected: [&[u8]; 3] = [b"%PDF-1.5 alpha", &JPEG_BYTES, b"%PDF-1.5 gamma"];
    for (i, want) in expected.iter().enumerate() {
        let mut entry = zip.by_index(i).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents.as_slice(), *want, "entry {}", entry.name());
    }

    server.stop().await;
}

#[tokio::test]
async fn failed_fetch_is_visible_only_through_polling() {
    let remote = remote_files().await;
    let server = TestServer::start().await;

    let id = server.create_task().await;
    let failing = format!("{}/missing.pdf", remote.uri());
    let urls = vec![
        format!("{}/a.pdf", remote.uri()),
        failing.clone(),
        format!("{}/c.pdf", remote.uri()),
    ];

    let response = server
        .client
        .post(server.url(&format!("/tasks/{id}/files")))
        .json(&urls)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let view = server.wait_for_terminal(&id).await;
    assert_eq!(view.status, TaskStatus::Failed);
    assert!(view.files.is_empty());
    assert!(view.err.as_deref().unwrap().contains(&failing));

    let archive = server
        .client
        .get(server.url(&format!("/archives/{id}.zip")))
        .send()
        .await
        .unwrap();
    assert_eq!(archive.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn admission_ceiling_frees_up_after_completion() {
    let remote = remote_files().await;
    let server = TestServer::start_with(|c| c.max_active_tasks = 1).await;

    let id = server.create_task().await;
    let busy = server.client.post(server.url("/tasks")).send().await.unwrap();
    assert_eq!(busy.status(), 429);
    let body: serde_json::Value = busy.json().await.unwrap();
    assert_eq!(body["error"], "server busy");

    let submitted = server
        .client
        .post(server.url(&format!("/tasks/{id}/files")))
        .json(&[format!("{}/a.pdf", remote.uri())])
        .send()
        .await
        .unwrap();
    assert_eq!(submitted.status(), 201);
    assert_eq!(server.wait_for_terminal(&id).await.status, TaskStatus::Done);

    server.create_task().await;
    server.stop().await;
}
