//! Common test utilities for archive-dl end-to-end tests

#![allow(dead_code)]

use archive_dl::{ArchiveDownloader, Config, TaskView};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running server bound to an ephemeral port
pub struct TestServer {
    pub address: SocketAddr,
    pub downloader: Arc<ArchiveDownloader>,
    pub client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<archive_dl::Result<()>>>,
    _temp_dir: tempfile::TempDir,
}

impl TestServer {
    /// Start a server with defaults rooted in a temp dir
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start a server with a caller-adjusted config
    pub async fn start_with(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config {
            temp_folder: temp_dir.path().join("files"),
            fetch_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        adjust(&mut config);

        let downloader = Arc::new(ArchiveDownloader::new(config).await.unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(archive_dl::api::serve(
            listener,
            downloader.clone(),
            downloader.config(),
            async move {
                let _ = rx.await;
            },
        ));

        Self {
            address,
            downloader,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
            _temp_dir: temp_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    /// POST /tasks and return the new id
    pub async fn create_task(&self) -> String {
        let response = self.client.post(self.url("/tasks")).send().await.unwrap();
        assert_eq!(response.status(), 201);
        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    /// Poll GET /tasks/:id until done or err
    pub async fn wait_for_terminal(&self, id: &str) -> TaskView {
        for _ in 0..500 {
            let view: TaskView = self
                .client
                .get(self.url(&format!("/tasks/{id}")))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            if view.status.is_terminal() {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("task {id} never finished");
    }

    /// Stop the listener and drain pipelines
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
        self.downloader.shutdown().await.unwrap();
    }
}
