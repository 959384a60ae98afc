use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{FaceSwapper, ModelInfo, SwapperError};

/// Builds a ready-to-use adapter. Called at most once per successful load.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn FaceSwapper>, SwapperError>;

    /// Model names reported before anything is loaded
    fn model_info(&self) -> ModelInfo;
}

/// Lazily-initialized adapter shared by all requests.
///
/// Concurrent first callers wait on the same initialization. A failed load
/// leaves the handle empty, so the next caller tries again.
pub struct ModelHandle {
    loader: Arc<dyn ModelLoader>,
    cell: OnceCell<Arc<dyn FaceSwapper>>,
}

impl ModelHandle {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            cell: OnceCell::new(),
        }
    }

    /// Handle that is already initialized with `swapper`
    pub fn preloaded(loader: Arc<dyn ModelLoader>, swapper: Arc<dyn FaceSwapper>) -> Self {
        Self {
            loader,
            cell: OnceCell::new_with(Some(swapper)),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn FaceSwapper>, SwapperError> {
        let swapper = self
            .cell
            .get_or_try_init(|| async {
                let start = Instant::now();
                tracing::info!("Loading face swap models");
                match self.loader.load().await {
                    Ok(swapper) => {
                        tracing::info!(
                            duration_ms = start.elapsed().as_millis() as u64,
                            "Face swap models loaded"
                        );
                        Ok(swapper)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to load face swap models");
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(swapper))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Does not trigger loading
    pub fn model_info(&self) -> ModelInfo {
        match self.cell.get() {
            Some(swapper) => swapper.model_info(),
            None => self.loader.model_info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swapper::{FaceEmbedding, VideoJob};
    use image::DynamicImage;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NoopSwapper;

    #[async_trait]
    impl FaceSwapper for NoopSwapper {
        async fn detect_single_face(
            &self,
            _image_path: &Path,
        ) -> Result<Option<FaceEmbedding>, SwapperError> {
            Ok(None)
        }

        async fn swap_image(
            &self,
            _face: &FaceEmbedding,
            _target_path: &Path,
        ) -> Result<DynamicImage, SwapperError> {
            Ok(DynamicImage::new_rgb8(1, 1))
        }

        async fn swap_video(&self, _job: &VideoJob) -> Result<(), SwapperError> {
            Ok(())
        }

        fn model_info(&self) -> ModelInfo {
            info("loaded")
        }
    }

    fn info(name: &str) -> ModelInfo {
        ModelInfo {
            detector: name.to_string(),
            swapper: name.to_string(),
            execution_provider: "cpu".to_string(),
        }
    }

    /// Fails the first `failures` loads, then succeeds
    struct CountingLoader {
        calls: AtomicUsize,
        failures: usize,
    }

    #[async_trait]
    impl ModelLoader for CountingLoader {
        async fn load(&self) -> Result<Arc<dyn FaceSwapper>, SwapperError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if call < self.failures {
                return Err(SwapperError::Initialization("model file missing".to_string()));
            }
            Ok(Arc::new(NoopSwapper))
        }

        fn model_info(&self) -> ModelInfo {
            info("pending")
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_load_once() {
        let loader = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
            failures: 0,
        });
        let handle = Arc::new(ModelHandle::new(loader.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.get().await.is_ok() })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap());
        }
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert!(handle.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loader = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
            failures: 1,
        });
        let handle = ModelHandle::new(loader.clone());

        assert!(handle.get().await.is_err());
        assert!(!handle.is_loaded());

        assert!(handle.get().await.is_ok());
        assert!(handle.is_loaded());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_model_info_does_not_load() {
        let loader = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
            failures: 0,
        });
        let handle = ModelHandle::new(loader.clone());

        assert_eq!(handle.model_info().detector, "pending");
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);

        handle.get().await.unwrap();
        assert_eq!(handle.model_info().detector, "loaded");
    }
}
