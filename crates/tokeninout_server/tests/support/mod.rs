//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokeninout_server::{create_app, AppState, Config, MemoryStore};

pub(crate) fn test_config_for_root(root: &Path) -> Config {
    Config {
        port: 0,
        content_root: root.to_str().expect("content root").to_string(),
        ..Config::default()
    }
}

pub(crate) fn test_server_for_config(config: Config) -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config, store.clone());
    let app = create_app(state, false);
    let server = TestServer::new(app).expect("server");
    (server, store)
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir, Arc<MemoryStore>) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_root(temp_dir.path());
    let (server, store) = test_server_for_config(config);
    (server, temp_dir, store)
}

pub(crate) fn article(title: &str, description: &str, date: &str, body: &str) -> String {
    format!(
        "---\ntitle: {}\ndescription: {}\ndate: {}\n---\n{}",
        title, description, date, body
    )
}

pub(crate) fn write_mirror_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, content).expect("write mirror file");
}
