//! Test infrastructure for file download integration tests.
//!
//! Provides a `TestApp` wrapper around `axum_test::TestServer` built from the
//! same router as the binary, over either the bundled or a directory store.

#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;

use file_downloads::config::{Config, DownloadConfig, ResourceSource, ResourcesConfig};
use file_downloads::services::{DirectoryResources, EmbeddedResources, ResourceStore};
use file_downloads::{build_router, AppState};

/// Test application wrapper around axum_test::TestServer.
pub struct TestApp {
    server: TestServer,
    router: Router,
}

impl TestApp {
    /// Create a test application serving the bundled resources.
    pub fn new() -> Self {
        Self::with_store(test_config(), Arc::new(EmbeddedResources))
    }

    /// Create a test application serving files from `dir`.
    pub fn with_directory(dir: &Path) -> Self {
        Self::with_directory_and_download(dir, DownloadConfig::default())
    }

    /// Create a test application serving files from `dir` with custom download options.
    pub fn with_directory_and_download(dir: &Path, download: DownloadConfig) -> Self {
        let mut config = test_config();
        config.resources = ResourcesConfig {
            source: ResourceSource::Directory,
            directory: dir.to_path_buf(),
        };
        config.download = download;
        Self::with_store(config, Arc::new(DirectoryResources::new(dir)))
    }

    /// Create a test application with custom download options.
    pub fn with_download_config(download: DownloadConfig) -> Self {
        let mut config = test_config();
        config.download = download;
        Self::with_store(config, Arc::new(EmbeddedResources))
    }

    fn with_store(config: Config, resources: Arc<dyn ResourceStore>) -> Self {
        let state = AppState {
            config: Arc::new(config),
            resources,
        };
        let router = build_router(state);
        let server = TestServer::new(router.clone()).expect("Failed to create test server");
        Self { server, router }
    }

    /// Get a reference to the test server.
    pub fn server(&self) -> &TestServer {
        &self.server
    }

    /// Get a clone of the router for driving requests with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config
}
