//! Application setup and initialization
//!
//! Everything main.rs needs to go from a loaded `Config` to a served router.

pub mod models;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use faceswap_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        version = %config.version(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let models = models::setup_models(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), models, storage));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
