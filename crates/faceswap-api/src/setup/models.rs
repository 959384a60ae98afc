//! Face-swap model handle setup

use std::sync::Arc;

use anyhow::{Context, Result};
use faceswap_core::Config;
use faceswap_processing::{CommandLoader, ModelHandle};

/// Build the shared model handle. With `PRELOAD_MODELS` set the models are
/// loaded before the server starts accepting requests.
pub async fn setup_models(config: &Config) -> Result<Arc<ModelHandle>> {
    let adapter = config.adapter();
    let loader = Arc::new(CommandLoader::new(adapter.clone()));
    let handle = Arc::new(ModelHandle::new(loader));

    tracing::info!(
        program = %adapter.program,
        execution_provider = %adapter.execution_provider,
        preload = adapter.preload_models,
        "Face swap adapter configured"
    );

    if adapter.preload_models {
        handle
            .get()
            .await
            .context("Failed to preload face swap models")?;
    }

    Ok(handle)
}
