use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for result storage (e.g., "/var/lib/faceswap/results")
    /// * `base_url` - Base URL the directory is served from (e.g., "http://localhost:8080/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, refusing anything that escapes the base directory
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);
        if !path.starts_with(&self.base_path) {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        storage_key: &str,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();
        let size = fs::copy(local_path, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                local_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local file upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_file_copies_into_base_path() {
        let base = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(base.path(), "http://localhost:8080/files/".to_string())
            .await
            .unwrap();

        let source = scratch.path().join("output.png");
        fs::write(&source, b"result").await.unwrap();

        let url = storage
            .upload_file(&source, "results/req-1/output.png", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8080/files/results/req-1/output.png");
        let copied = fs::read(base.path().join("results/req-1/output.png"))
            .await
            .unwrap();
        assert_eq!(copied, b"result");
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let base = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(base.path(), "http://localhost/files".to_string())
            .await
            .unwrap();

        let result = storage
            .upload_with_key("results/../../etc/passwd", Bytes::from_static(b"x"), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_missing_source_file_is_upload_error() {
        let base = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(base.path(), "http://localhost/files".to_string())
            .await
            .unwrap();

        let result = storage
            .upload_file(Path::new("/nonexistent/output.mp4"), "results/x/output.mp4", "video/mp4")
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }
}
