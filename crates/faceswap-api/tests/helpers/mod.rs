//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p faceswap-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;
pub mod swapper;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use faceswap_api::setup::routes;
use faceswap_api::state::AppState;
use faceswap_core::{CleanupTrigger, Config};
use faceswap_processing::ModelHandle;
use faceswap_storage::Storage;
use tempfile::TempDir;

use self::swapper::FakeLoader;

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub loader: Arc<FakeLoader>,
    pub _workspace_root: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn workspace_root(&self) -> &Path {
        self._workspace_root.path()
    }

    /// Poll until no request workspace is left on disk
    pub async fn wait_for_empty_workspace_root(&self) -> bool {
        for _ in 0..50 {
            let empty = std::fs::read_dir(self.workspace_root())
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if empty {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

pub struct TestAppBuilder {
    loader: FakeLoader,
    storage: Option<Arc<dyn Storage>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            loader: FakeLoader::default(),
            storage: None,
        }
    }

    pub fn with_loader(mut self, loader: FakeLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> TestApp {
        let workspace_root = tempfile::tempdir().expect("Failed to create workspace root");

        let mut config = Config::default();
        config.workspace.root = workspace_root.path().to_path_buf();
        config.workspace.cleanup = CleanupTrigger::OnComplete;
        config.base.environment = "test".to_string();

        let loader = Arc::new(self.loader);
        let models = Arc::new(ModelHandle::new(loader.clone()));
        let state = Arc::new(AppState::new(config.clone(), models, self.storage));

        let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
        let server = TestServer::new(router).expect("Failed to start test server");

        TestApp {
            server,
            state,
            loader,
            _workspace_root: workspace_root,
        }
    }
}

pub fn setup_test_app() -> TestApp {
    TestAppBuilder::new().build()
}
