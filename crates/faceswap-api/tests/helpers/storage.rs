//! Result storage fakes.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use faceswap_storage::{Storage, StorageBackend, StorageError, StorageResult};

pub const RESULT_BASE_URL: &str = "https://results.example.com";

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub content_type: String,
    pub size_bytes: usize,
}

/// Accepts every upload and remembers it
#[derive(Default)]
pub struct RecordingStorage {
    pub uploads: Mutex<Vec<RecordedUpload>>,
}

impl RecordingStorage {
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: storage_key.to_string(),
            content_type: content_type.to_string(),
            size_bytes: data.len(),
        });
        Ok(format!("{}/{}", RESULT_BASE_URL, storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Gcs
    }
}

/// Rejects every upload
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn upload_with_key(
        &self,
        _storage_key: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        Err(StorageError::UploadFailed("bucket unreachable".to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
