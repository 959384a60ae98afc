use std::sync::Arc;

use faceswap_core::StorageConfig;

#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-object")]
use crate::ObjectStoreStorage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};

/// Create the result storage backend described by configuration.
///
/// Returns `Ok(None)` when no backend is configured; results are then always
/// delivered inline.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Option<Arc<dyn Storage>>> {
    let Some(backend) = config.backend else {
        return Ok(None);
    };

    match backend {
        #[cfg(feature = "storage-object")]
        StorageBackend::Gcs => {
            let bucket = config.bucket.clone().ok_or_else(|| {
                StorageError::ConfigError("STORAGE_BUCKET not configured".to_string())
            })?;
            let storage = ObjectStoreStorage::gcs(bucket, config.public_base_url.clone())?;
            Ok(Some(Arc::new(storage)))
        }

        #[cfg(feature = "storage-object")]
        StorageBackend::S3 => {
            let bucket = config.bucket.clone().ok_or_else(|| {
                StorageError::ConfigError("STORAGE_BUCKET not configured".to_string())
            })?;
            let region = config.region.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "STORAGE_REGION or AWS_REGION not configured".to_string(),
                )
            })?;
            let storage = ObjectStoreStorage::s3(
                bucket,
                region,
                config.endpoint.clone(),
                config.public_base_url.clone(),
            )?;
            Ok(Some(Arc::new(storage)))
        }

        #[cfg(not(feature = "storage-object"))]
        StorageBackend::Gcs | StorageBackend::S3 => Err(StorageError::ConfigError(
            "Object storage backends not available (storage-object feature not enabled)"
                .to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config
                .local_storage_base_url
                .clone()
                .unwrap_or_else(|| format!("file://{}", base_path.trim_end_matches('/')));

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Some(Arc::new(storage)))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
