//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs against the file-backed item repository and local media
//! store inside a temp directory, so no external services are needed.
//! Run with: `cargo test -p casita-api`.

use axum_test::TestServer;
use casita_api::setup::routes;
use casita_api::state::AppState;
use casita_core::{Config, ItemsBackend, MediaBackend, DEFAULT_WHATSAPP_MESSAGE};
use casita_db::JsonFileRepository;
use casita_storage::LocalMediaStore;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const TEST_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Test application: server plus the temp paths backing it.
pub struct TestApp {
    pub server: TestServer,
    pub uploads_dir: PathBuf,
    pub data_file: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Filenames currently present in the uploads directory.
    pub fn stored_blobs(&self) -> Vec<String> {
        match std::fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_app(TEST_MAX_UPLOAD_BYTES, None).await
}

/// App with a small per-file ceiling, for oversize-upload tests.
pub async fn setup_test_app_with_limit(max_upload_bytes: usize) -> TestApp {
    setup_app(max_upload_bytes, None).await
}

/// App whose data file is pre-seeded with raw JSON records.
pub async fn setup_test_app_with_data(records: serde_json::Value) -> TestApp {
    setup_app(TEST_MAX_UPLOAD_BYTES, Some(records)).await
}

async fn setup_app(max_upload_bytes: usize, seed: Option<serde_json::Value>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let data_file = temp_dir.path().join("items.json");
    let uploads_dir = temp_dir.path().join("uploads");

    if let Some(records) = seed {
        std::fs::write(
            &data_file,
            serde_json::to_vec_pretty(&records).expect("Failed to serialize seed data"),
        )
        .expect("Failed to write seed data");
    }

    let config = Config {
        server_port: 0,
        environment: "test".to_string(),
        items_backend: ItemsBackend::JsonFile,
        media_backend: MediaBackend::Local,
        database_url: None,
        data_file: data_file.to_string_lossy().into_owned(),
        uploads_dir: uploads_dir.to_string_lossy().into_owned(),
        uploads_base_url: "/uploads".to_string(),
        static_site_dir: None,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        max_upload_bytes,
        default_whatsapp_message: DEFAULT_WHATSAPP_MESSAGE.to_string(),
    };

    let items = Arc::new(
        JsonFileRepository::new(config.data_file.clone())
            .await
            .expect("Failed to open data file"),
    );
    let media = Arc::new(
        LocalMediaStore::new(config.uploads_dir.clone(), config.uploads_base_url.clone())
            .await
            .expect("Failed to create local media store"),
    );

    let state = AppState {
        config: config.clone(),
        items,
        media,
    };

    let server =
        TestServer::new(routes::build_router(&config, state)).expect("Failed to start test server");

    TestApp {
        server,
        uploads_dir,
        data_file,
        _temp_dir: temp_dir,
    }
}
