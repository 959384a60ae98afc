//! Service status endpoints

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use faceswap_core::{AppError, OutputFormat};
use faceswap_processing::{encode_image, synthetic_face, FileRole, Workspace};
use image::DynamicImage;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{BENCHMARK_IMAGE_SIZE, ENDPOINTS};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    pub message: String,
    pub status: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub models_loaded: bool,
    pub cloud_storage: bool,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelNames {
    pub detector: String,
    pub swapper: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelInfoResponse {
    pub status: String,
    pub models_loaded: bool,
    pub models: ModelNames,
    pub execution_provider: String,
    pub memory_usage_mb: f64,
    pub environment: String,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BenchmarkResponse {
    pub status: String,
    /// Seconds spent on detection and swap
    pub benchmark_time: f64,
    pub memory_usage_mb: f64,
    pub models_loaded: bool,
    pub faces_detected: usize,
    pub image_size: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "status",
    responses((status = 200, description = "Service banner", body = HomeResponse))
)]
pub async fn home(State(state): State<Arc<AppState>>) -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Face swap API".to_string(),
        status: "running".to_string(),
        version: state.config.version().to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "status",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: state.status().to_string(),
        timestamp: Utc::now().to_rfc3339(),
        models_loaded: state.models.is_loaded(),
        cloud_storage: state.storage.is_some(),
        version: state.config.version().to_string(),
        environment: state.config.environment().to_string(),
    })
}

/// Report model names and memory usage without loading anything
#[utoipa::path(
    get,
    path = "/model-info",
    tag = "status",
    responses((status = 200, description = "Model details", body = ModelInfoResponse))
)]
pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let info = state.models.model_info();

    Json(ModelInfoResponse {
        status: state.status().to_string(),
        models_loaded: state.models.is_loaded(),
        models: ModelNames {
            detector: info.detector,
            swapper: info.swapper,
        },
        execution_provider: info.execution_provider,
        memory_usage_mb: state.monitor.memory_usage_mb(),
        environment: state.config.environment().to_string(),
        version: state.config.version().to_string(),
    })
}

/// Run detection and an image swap on a synthetic face
#[utoipa::path(
    get,
    path = "/benchmark",
    tag = "status",
    responses(
        (status = 200, description = "Benchmark results", body = BenchmarkResponse),
        (status = 500, description = "Models failed to load", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn benchmark(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BenchmarkResponse>, HttpAppError> {
    let run_id = Uuid::new_v4();
    let production = state.config.is_production();
    let fail = |e: AppError| {
        HttpAppError::new(e)
            .with_request_id(run_id)
            .in_production(production)
    };

    let workspace = state.workspaces.create(run_id).await.map_err(|e| fail(e.into()))?;
    let result = run_benchmark(&state, &workspace).await;
    workspace.release().await;

    let (benchmark_time, faces_detected) = result.map_err(fail)?;
    tracing::info!(benchmark_time, faces_detected, "Benchmark completed");

    Ok(Json(BenchmarkResponse {
        status: "success".to_string(),
        benchmark_time,
        memory_usage_mb: state.monitor.memory_usage_mb(),
        models_loaded: state.models.is_loaded(),
        faces_detected,
        image_size: format!("{}x{}", BENCHMARK_IMAGE_SIZE, BENCHMARK_IMAGE_SIZE),
    }))
}

async fn run_benchmark(state: &AppState, workspace: &Workspace) -> Result<(f64, usize), AppError> {
    let face = DynamicImage::ImageRgb8(synthetic_face(BENCHMARK_IMAGE_SIZE));
    let source = workspace.stage(FileRole::Source, Some("face.png"))?;
    let target = workspace.stage(FileRole::Target, Some("face.png"))?;
    encode_image(face.clone(), &source, OutputFormat::Png).await?;
    encode_image(face, &target, OutputFormat::Png).await?;

    let _permit = state
        .swap_permits
        .acquire()
        .await
        .map_err(|e| AppError::Internal(format!("Swap limiter closed: {}", e)))?;
    let swapper = state.models.get().await?;

    let start = Instant::now();
    let faces_detected = match swapper.detect_single_face(&source).await? {
        Some(embedding) => {
            swapper.swap_image(&embedding, &target).await?;
            1
        }
        None => 0,
    };

    Ok((start.elapsed().as_secs_f64(), faces_detected))
}
