use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload,
    Result as ObjectResult,
};

use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;

/// Object storage implementation (Google Cloud Storage or S3)
#[derive(Clone)]
pub struct ObjectStoreStorage {
    store: Arc<dyn ObjectStore>,
    backend: StorageBackend,
    bucket: String,
    region: Option<String>,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    public_base_url: Option<String>,
}

impl ObjectStoreStorage {
    /// Create a Google Cloud Storage backend.
    ///
    /// Credentials are picked up from the environment
    /// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, ...).
    pub fn gcs(bucket: String, public_base_url: Option<String>) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(ObjectStoreStorage {
            store: Arc::new(store),
            backend: StorageBackend::Gcs,
            bucket,
            region: None,
            endpoint_url: None,
            public_base_url,
        })
    }

    /// Create an S3 backend
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `public_base_url` - Optional URL prefix used instead of the provider URL
    pub fn s3(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_base_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(ObjectStoreStorage {
            store: Arc::new(store),
            backend: StorageBackend::S3,
            bucket,
            region: Some(region),
            endpoint_url,
            public_base_url,
        })
    }

    /// Wrap an existing store, e.g. `object_store::memory::InMemory` in tests.
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        backend: StorageBackend,
        bucket: String,
        public_base_url: Option<String>,
    ) -> Self {
        ObjectStoreStorage {
            store,
            backend,
            bucket,
            region: None,
            endpoint_url: None,
            public_base_url,
        }
    }

    /// Generate public URL for an object
    ///
    /// `public_base_url` wins when configured. Otherwise GCS uses
    /// `https://storage.googleapis.com/{bucket}/{key}`, AWS S3 uses the
    /// virtual-hosted format and S3-compatible endpoints use path style.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref base) = self.public_base_url {
            return format!("{}/{}", base.trim_end_matches('/'), key);
        }

        match self.backend {
            StorageBackend::Gcs => {
                format!("https://storage.googleapis.com/{}/{}", self.bucket, key)
            }
            _ => match (&self.endpoint_url, &self.region) {
                (Some(endpoint), _) => {
                    format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
                }
                (None, Some(region)) => {
                    format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, region, key)
                }
                (None, None) => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
            },
        }
    }
}

#[async_trait]
impl Storage for ObjectStoreStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;

        let size = data.len() as u64;
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(data), opts)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.backend,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            backend = %self.backend,
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
