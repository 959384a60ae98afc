//! Storage setup and initialization

use std::sync::Arc;

use anyhow::Result;
use faceswap_core::Config;
use faceswap_storage::{create_storage, Storage};

/// `None` when no result storage is configured; results are then always
/// returned inline.
pub async fn setup_storage(config: &Config) -> Result<Option<Arc<dyn Storage>>> {
    let Some(storage) = create_storage(config.storage()).await? else {
        tracing::info!("No result storage configured, results will be returned inline");
        return Ok(None);
    };

    tracing::info!(
        backend = %storage.backend_type(),
        bucket = ?config.storage().bucket,
        "Result storage initialized"
    );
    Ok(Some(storage))
}
