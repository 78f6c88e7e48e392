//! Test helpers for web API tests.
//!
//! Builds an in-process `axum_test::TestServer` around the real router with a
//! temporary storage directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use filedrop::config::Config;
use filedrop::file::FileStorage;
use filedrop::web::create_router;
use filedrop::web::handlers::AppState;

/// A running test server and the directory it stores uploads in.
pub struct TestApp {
    pub server: TestServer,
    pub storage_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    /// Read a stored file's content.
    pub fn stored(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.storage_dir.join(name)).expect("stored file should exist")
    }

    /// Whether a stored file exists.
    pub fn exists(&self, name: &str) -> bool {
        self.storage_dir.join(name).exists()
    }

    /// Write a file directly into the storage directory.
    pub fn seed(&self, name: &str, content: &[u8]) {
        std::fs::write(self.storage_dir.join(name), content).expect("Failed to seed file");
    }

    /// Names of all entries in the storage directory, sorted.
    pub fn entries(&self) -> Vec<String> {
        list_dir(&self.storage_dir)
    }
}

/// Create a test configuration with static serving disabled.
pub fn test_config(storage_dir: &Path) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.storage.path = storage_dir.to_string_lossy().into_owned();
    config.static_files.enabled = false;
    config
}

/// Create a test server with an empty storage directory.
pub fn create_test_app() -> TestApp {
    create_test_app_with(|_| {})
}

/// Create a test server, letting the caller adjust the configuration.
pub fn create_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage_dir = temp_dir.path().join("data");
    std::fs::create_dir_all(&storage_dir).expect("Failed to create storage dir");

    let mut config = test_config(&storage_dir);
    configure(&mut config);

    let storage = FileStorage::open(&config.storage.path);
    let state = AppState::new(storage)
        .with_unsafe_filename_rejection(config.storage.reject_unsafe_filenames);
    let router = create_router(Arc::new(state), &config);

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        storage_dir,
        _temp_dir: temp_dir,
    }
}

/// Build a multipart form with a single `file` part.
pub fn file_form(filename: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(content.to_vec()).file_name(filename))
}

/// Sorted entry names of a directory.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
