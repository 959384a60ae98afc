//! Faceswap Storage Library
//!
//! Upload of generated results to object storage (Google Cloud Storage,
//! S3 and S3-compatible providers) or a local directory.
//!
//! # Storage key format
//!
//! Every backend stores results under `results/{request_id}/{file_name}`.
//! Keys must not contain `..` or a leading `/`. Key generation lives in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-object")]
pub mod cloud;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use faceswap_core::StorageBackend;
pub use keys::result_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-object")]
pub use cloud::ObjectStoreStorage;
pub use traits::{Storage, StorageError, StorageResult};
