//! Storage abstraction trait
//!
//! This module defines the Storage trait that all result backends implement.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Only finished artifacts are ever uploaded. Implementations return the
/// public URL of the uploaded object.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload in-memory data to a specific storage key and return its public URL.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Upload a file from disk to a specific storage key and return its public URL.
    async fn upload_file(
        &self,
        local_path: &Path,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to read {}: {}",
                local_path.display(),
                e
            ))
        })?;
        self.upload_with_key(storage_key, Bytes::from(data), content_type)
            .await
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
