//! Per-request scratch workspaces
//!
//! Each request owns one directory under the configured root. Files are staged
//! into it by role, and the whole directory is removed once the response no
//! longer needs it. Removal always runs on the blocking pool and never reports
//! failure to the caller.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use faceswap_core::{AppError, CleanupTrigger, WorkspaceConfig};
use tempfile::TempDir;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Failed to create workspace under {root}: {source}")]
    Create {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Workspace {0} has already been released")]
    Released(Uuid),
}

impl From<WorkspaceError> for AppError {
    fn from(err: WorkspaceError) -> Self {
        AppError::Allocation(err.to_string())
    }
}

/// What a staged file is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Source,
    Target,
    Output,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Source => "source",
            FileRole::Target => "target",
            FileRole::Output => "output",
        }
    }
}

/// Keep only a short alphanumeric extension from a client-supplied name.
fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_lowercase();
    (!ext.is_empty()).then_some(ext)
}

/// Creates workspaces and knows when they are released
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
    cleanup: CleanupTrigger,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>, cleanup: CleanupTrigger) -> Self {
        Self {
            root: root.into(),
            cleanup,
        }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::new(config.root.clone(), config.cleanup)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cleanup_trigger(&self) -> CleanupTrigger {
        self.cleanup
    }

    /// Allocate a fresh directory for `request_id`.
    pub async fn create(&self, request_id: Uuid) -> Result<Arc<Workspace>, WorkspaceError> {
        let root = self.root.clone();
        let prefix = format!("faceswap_{}_", request_id);

        let created = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&root)?;
            tempfile::Builder::new().prefix(&prefix).tempdir_in(&root)
        })
        .await
        .map_err(|e| WorkspaceError::Create {
            root: self.root.clone(),
            source: io::Error::new(io::ErrorKind::Other, e),
        })?;

        let dir = created.map_err(|source| WorkspaceError::Create {
            root: self.root.clone(),
            source,
        })?;

        tracing::debug!(
            request_id = %request_id,
            path = %dir.path().display(),
            "Workspace created"
        );

        Ok(Arc::new(Workspace {
            request_id,
            path: dir.path().to_path_buf(),
            dir: Mutex::new(Some(dir)),
        }))
    }

    /// Arrange for `workspace` to be released according to the configured
    /// trigger. Returns a guard when the caller must tie release to a response
    /// body; `None` means release has already been scheduled.
    pub fn schedule_release(
        &self,
        workspace: Arc<Workspace>,
        streaming: bool,
    ) -> Option<ReleaseGuard> {
        match self.cleanup {
            CleanupTrigger::OnComplete if streaming => Some(ReleaseGuard::new(workspace)),
            _ => {
                self.release(workspace);
                None
            }
        }
    }

    /// Release a workspace no response body depends on
    pub fn release(&self, workspace: Arc<Workspace>) {
        match self.cleanup {
            CleanupTrigger::OnComplete => workspace.spawn_release(),
            CleanupTrigger::Delayed(delay) => workspace.release_after(delay),
        }
    }
}

/// Exclusively-owned directory for one request
#[derive(Debug)]
pub struct Workspace {
    request_id: Uuid,
    path: PathBuf,
    dir: Mutex<Option<TempDir>>,
}

impl Workspace {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.dir.lock().map(|d| d.is_none()).unwrap_or(true)
    }

    /// Reserve a unique path `{role}_{request_id}_{uuid}{.ext}` inside the workspace.
    ///
    /// The extension is taken from `original_name` after sanitizing. Nothing
    /// is created on disk.
    pub fn stage(
        &self,
        role: FileRole,
        original_name: Option<&str>,
    ) -> Result<PathBuf, WorkspaceError> {
        if self.is_released() {
            return Err(WorkspaceError::Released(self.request_id));
        }

        let mut file_name = format!("{}_{}_{}", role.as_str(), self.request_id, Uuid::new_v4());
        if let Some(ext) = original_name.and_then(sanitized_extension) {
            file_name.push('.');
            file_name.push_str(&ext);
        }

        Ok(self.path.join(file_name))
    }

    fn take_dir(&self) -> Option<TempDir> {
        match self.dir.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// Remove the directory. Idempotent; failures are logged only.
    pub async fn release(&self) {
        let Some(dir) = self.take_dir() else {
            tracing::debug!(request_id = %self.request_id, "Workspace already released");
            return;
        };

        let request_id = self.request_id;
        let path = self.path.clone();
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(Ok(())) => {
                tracing::debug!(request_id = %request_id, path = %path.display(), "Workspace released");
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    request_id = %request_id,
                    path = %path.display(),
                    error = %e,
                    "Workspace cleanup failed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "Workspace cleanup task failed"
                );
            }
        }
    }

    /// Synchronous variant for contexts without a runtime
    fn release_blocking(&self) {
        if let Some(dir) = self.take_dir() {
            if let Err(e) = dir.close() {
                tracing::warn!(
                    request_id = %self.request_id,
                    error = %e,
                    "Workspace cleanup failed"
                );
            }
        }
    }

    /// Release in a background task
    pub fn spawn_release(self: Arc<Self>) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { self.release().await });
            }
            Err(_) => self.release_blocking(),
        }
    }

    /// Release in a background task after `delay`
    pub fn release_after(self: Arc<Self>, delay: Duration) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    self.release().await;
                });
            }
            Err(_) => self.release_blocking(),
        }
    }
}

/// Releases its workspace when dropped.
///
/// Moved into a streaming response body so that removal happens once the
/// transport is done with the body, whether it finished or was aborted.
#[derive(Debug)]
pub struct ReleaseGuard {
    workspace: Option<Arc<Workspace>>,
}

impl ReleaseGuard {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self {
            workspace: Some(workspace),
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if let Some(workspace) = self.workspace.take() {
            workspace.spawn_release();
        }
    }
}
