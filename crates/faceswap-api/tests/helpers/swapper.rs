//! In-process stand-in for the face-swap adapter.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use faceswap_processing::{
    FaceBox, FaceEmbedding, FaceSwapper, ModelInfo, ModelLoader, SwapperError, VideoJob,
};
use image::{DynamicImage, Rgb};

/// Marker painted over the swapped region
pub const SWAP_MARK: Rgb<u8> = Rgb([0, 255, 0]);

fn info() -> ModelInfo {
    ModelInfo {
        detector: "fake-detector".to_string(),
        swapper: "fake-swapper".to_string(),
        execution_provider: "cpu".to_string(),
    }
}

/// What `swap_video` leaves at the output path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoOutput {
    /// Copy the target unchanged
    #[default]
    Copy,
    /// Report success without writing anything
    Missing,
    /// Write a zero-length file
    Empty,
}

/// Treats any non-uniform image as containing one face, paints a green
/// square at (10,10)..(20,20) when swapping, and handles videos per
/// [`VideoOutput`].
pub struct FakeSwapper {
    pub video: VideoOutput,
}

#[async_trait]
impl FaceSwapper for FakeSwapper {
    async fn detect_single_face(
        &self,
        image_path: &Path,
    ) -> Result<Option<FaceEmbedding>, SwapperError> {
        let img = image::open(image_path)?.to_rgb8();
        let first = *img.get_pixel(0, 0);
        if img.pixels().all(|p| *p == first) {
            return Ok(None);
        }

        Ok(Some(FaceEmbedding {
            vector: vec![0.5; 4],
            bbox: FaceBox {
                x: 0.0,
                y: 0.0,
                width: img.width() as f32,
                height: img.height() as f32,
            },
            score: 0.99,
            origin: image_path.to_path_buf(),
        }))
    }

    async fn swap_image(
        &self,
        _face: &FaceEmbedding,
        target_path: &Path,
    ) -> Result<DynamicImage, SwapperError> {
        let mut img = image::open(target_path)?.to_rgb8();
        for x in 10..20.min(img.width()) {
            for y in 10..20.min(img.height()) {
                img.put_pixel(x, y, SWAP_MARK);
            }
        }
        Ok(DynamicImage::ImageRgb8(img))
    }

    async fn swap_video(&self, job: &VideoJob) -> Result<(), SwapperError> {
        match self.video {
            VideoOutput::Copy => {
                tokio::fs::copy(&job.target, &job.output).await?;
            }
            VideoOutput::Missing => {}
            VideoOutput::Empty => {
                tokio::fs::write(&job.output, b"").await?;
            }
        }
        Ok(())
    }

    fn model_info(&self) -> ModelInfo {
        info()
    }
}

/// Counts loads and optionally fails every one of them
#[derive(Default)]
pub struct FakeLoader {
    pub loads: AtomicUsize,
    pub fail: bool,
    pub video: VideoOutput,
}

impl FakeLoader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_video_output(video: VideoOutput) -> Self {
        Self {
            video,
            ..Self::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for FakeLoader {
    async fn load(&self) -> Result<Arc<dyn FaceSwapper>, SwapperError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SwapperError::Initialization(
                "inswapper model not found".to_string(),
            ));
        }
        Ok(Arc::new(FakeSwapper { video: self.video }))
    }

    fn model_info(&self) -> ModelInfo {
        info()
    }
}
