use super::test_helpers::{create_test_downloader, create_test_downloader_with, wait_for_terminal};
use super::*;
use crate::types::{TaskId, TaskStatus};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};


/// Serve `body` with 200 at `route` on the mock server
async fn mount_file(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Read every entry of a ZIP archive as (name, contents)
fn read_archive(archive: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).unwrap();
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        entries.push((entry.name().to_string(), buf));
    }
    entries
}

fn base_name(path: &str) -> String {
    PathBuf::from(path)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}
