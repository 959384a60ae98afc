//! Face-swap adapter boundary
//!
//! Detection, identity embedding, compositing and video encoding are owned by
//! an external toolkit. This module defines the seam the request pipeline
//! talks to, the lazily-initialized handle that owns the loaded adapter, and
//! the shipped command-driven implementation.

mod command;
mod handle;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use faceswap_core::{AppError, SwapParameters};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

pub use command::{CommandLoader, CommandSwapper};
pub use handle::{ModelHandle, ModelLoader};

#[derive(Debug, thiserror::Error)]
pub enum SwapperError {
    #[error("Model initialization failed: {0}")]
    Initialization(String),

    #[error("Face detection failed: {0}")]
    Detection(String),

    #[error("Face swap failed: {0}")]
    Swap(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid adapter output: {0}")]
    InvalidOutput(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<SwapperError> for AppError {
    fn from(err: SwapperError) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: anyhow::Error::new(err),
        }
    }
}

/// Face bounding box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Identity of the single face found in a source image
#[derive(Debug, Clone, PartialEq)]
pub struct FaceEmbedding {
    pub vector: Vec<f32>,
    pub bbox: FaceBox,
    pub score: f32,
    /// Image the face was detected in
    pub origin: PathBuf,
}

/// Names of the loaded models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub detector: String,
    pub swapper: String,
    pub execution_provider: String,
}

/// A video swap request
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub source: PathBuf,
    pub target: PathBuf,
    pub output: PathBuf,
    pub params: SwapParameters,
}

#[async_trait]
pub trait FaceSwapper: Send + Sync {
    /// `None` when the image holds no usable face.
    async fn detect_single_face(
        &self,
        image_path: &Path,
    ) -> Result<Option<FaceEmbedding>, SwapperError>;

    /// Replace faces in the target image with `face`.
    async fn swap_image(
        &self,
        face: &FaceEmbedding,
        target_path: &Path,
    ) -> Result<DynamicImage, SwapperError>;

    /// Process a whole video, writing `job.output`.
    async fn swap_video(&self, job: &VideoJob) -> Result<(), SwapperError>;

    fn model_info(&self) -> ModelInfo;
}

pub type SharedSwapper = Arc<dyn FaceSwapper>;
