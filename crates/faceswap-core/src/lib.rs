//! Faceswap Core Library
//!
//! This crate provides configuration, error types and domain models shared by
//! the storage, processing and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{
    AdapterConfig, BaseConfig, CleanupTrigger, Config, LogFormat, StorageConfig, WorkspaceConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{MediaKind, OutputFormat, SwapParameters};
pub use storage_types::StorageBackend;
