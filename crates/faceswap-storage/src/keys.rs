//! Shared key generation for storage backends.
//!
//! Key format: `results/{request_id}/{file_name}`.

use uuid::Uuid;

use crate::{StorageError, StorageResult};

/// Generate the storage key for a request's result file.
pub fn result_key(request_id: Uuid, file_name: &str) -> String {
    format!("results/{}/{}", request_id, file_name)
}

/// Reject keys that could escape the backend's namespace.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}
