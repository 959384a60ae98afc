//! Command-driven adapter for an external face-swap toolkit.
//!
//! The toolkit is invoked as a subprocess using argument templates from
//! configuration. Placeholders `{source}`, `{target}`, `{output}` and
//! `{input}` are replaced with staged file paths.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use faceswap_core::AdapterConfig;
use image::DynamicImage;
use serde::Deserialize;
use tokio::process::Command;

use super::{FaceBox, FaceEmbedding, FaceSwapper, ModelInfo, ModelLoader, SwapperError, VideoJob};

const MAX_STDERR_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
struct DetectionOutput {
    #[serde(default)]
    faces: Vec<DetectedFace>,
}

#[derive(Debug, Deserialize)]
struct DetectedFace {
    /// x, y, width, height
    bbox: [f32; 4],
    #[serde(default)]
    score: f32,
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Expand a whitespace separated template into arguments
fn render_args(template: &str, bindings: &[(&str, &Path)]) -> Vec<String> {
    template
        .split_whitespace()
        .map(|token| {
            bindings.iter().fold(token.to_string(), |arg, (name, path)| {
                arg.replace(&format!("{{{}}}", name), &path.to_string_lossy())
            })
        })
        .collect()
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(MAX_STDERR_CHARS);
    text.chars().skip(skip).collect()
}

/// The detector may log freely; its result is the last JSON object line.
fn parse_detection(stdout: &[u8]) -> Result<DetectionOutput, SwapperError> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with('{'))
        .ok_or_else(|| {
            SwapperError::InvalidOutput("no JSON document in detector output".to_string())
        })?;

    serde_json::from_str(line).map_err(|e| SwapperError::InvalidOutput(e.to_string()))
}

/// Single-face policy: the leftmost detected face wins
fn leftmost_face(faces: Vec<DetectedFace>) -> Option<DetectedFace> {
    faces
        .into_iter()
        .min_by(|a, b| a.bbox[0].total_cmp(&b.bbox[0]))
}

fn first_token(template: &str) -> String {
    template
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn adapter_model_info(config: &AdapterConfig) -> ModelInfo {
    ModelInfo {
        detector: first_token(&config.detect_args),
        swapper: first_token(&config.image_args),
        execution_provider: config.execution_provider.clone(),
    }
}

/// Resolve `program` the way a shell would
fn locate_program(program: &str, workdir: Option<&Path>) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        let resolved = match workdir {
            Some(dir) if candidate.is_relative() => dir.join(candidate),
            _ => candidate.to_path_buf(),
        };
        return resolved.is_file().then_some(resolved);
    }

    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|path| path.is_file())
    })
}

pub struct CommandSwapper {
    config: AdapterConfig,
}

impl CommandSwapper {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    /// Arguments for a video job, template first then toolkit flags
    pub fn video_args(&self, job: &VideoJob) -> Vec<String> {
        let mut args = render_args(
            &self.config.video_args,
            &[
                ("source", job.source.as_path()),
                ("target", job.target.as_path()),
                ("output", job.output.as_path()),
                ("input", job.target.as_path()),
            ],
        );

        let params = &job.params;
        if params.keep_fps {
            args.push("--keep-fps".to_string());
        }
        if params.keep_frames {
            args.push("--keep-frames".to_string());
        }
        if params.skip_audio {
            args.push("--skip-audio".to_string());
        }
        if params.many_faces {
            args.push("--many-faces".to_string());
        }
        // The container follows the extension of the staged output path
        args.push("--execution-provider".to_string());
        args.push(self.config.execution_provider.clone());

        args
    }

    async fn run(
        &self,
        args: &[String],
        stage: &'static str,
        on_failure: fn(String) -> SwapperError,
    ) -> Result<Vec<u8>, SwapperError> {
        let start = Instant::now();
        let mut command = Command::new(&self.config.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = self.config.workdir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|source| SwapperError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr);
            tracing::warn!(
                stage = stage,
                program = %self.config.program,
                status = %output.status,
                duration_ms = start.elapsed().as_millis() as u64,
                stderr = %stderr,
                "Face swap toolkit failed"
            );
            return Err(on_failure(format!(
                "{} exited with {}: {}",
                self.config.program, output.status, stderr
            )));
        }

        tracing::debug!(
            stage = stage,
            program = %self.config.program,
            duration_ms = start.elapsed().as_millis() as u64,
            "Face swap toolkit finished"
        );

        Ok(output.stdout)
    }
}

#[async_trait]
impl FaceSwapper for CommandSwapper {
    async fn detect_single_face(
        &self,
        image_path: &Path,
    ) -> Result<Option<FaceEmbedding>, SwapperError> {
        let args = render_args(
            &self.config.detect_args,
            &[("input", image_path), ("source", image_path)],
        );
        let stdout = self.run(&args, "detect", SwapperError::Detection).await?;
        let detection = parse_detection(&stdout)?;

        tracing::debug!(faces = detection.faces.len(), "Faces detected");

        Ok(leftmost_face(detection.faces).map(|face| FaceEmbedding {
            vector: face.embedding,
            bbox: FaceBox {
                x: face.bbox[0],
                y: face.bbox[1],
                width: face.bbox[2],
                height: face.bbox[3],
            },
            score: face.score,
            origin: image_path.to_path_buf(),
        }))
    }

    async fn swap_image(
        &self,
        face: &FaceEmbedding,
        target_path: &Path,
    ) -> Result<DynamicImage, SwapperError> {
        let scratch_dir = target_path.parent().unwrap_or_else(|| Path::new("."));
        let scratch = tempfile::Builder::new()
            .prefix("swapped_")
            .suffix(".png")
            .tempfile_in(scratch_dir)?
            .into_temp_path();
        let scratch_path: &Path = &scratch;

        let args = render_args(
            &self.config.image_args,
            &[
                ("source", face.origin.as_path()),
                ("target", target_path),
                ("output", scratch_path),
                ("input", target_path),
            ],
        );
        self.run(&args, "swap_image", SwapperError::Swap).await?;

        let path = scratch_path.to_path_buf();
        let image = tokio::task::spawn_blocking(move || image::open(path))
            .await
            .map_err(|e| SwapperError::Swap(format!("Decoding task failed: {}", e)))??;

        Ok(image)
    }

    async fn swap_video(&self, job: &VideoJob) -> Result<(), SwapperError> {
        let args = self.video_args(job);
        self.run(&args, "swap_video", SwapperError::Swap).await?;
        Ok(())
    }

    fn model_info(&self) -> ModelInfo {
        adapter_model_info(&self.config)
    }
}

/// Loads [`CommandSwapper`] after checking the toolkit can be run
pub struct CommandLoader {
    config: AdapterConfig,
}

impl CommandLoader {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for CommandLoader {
    async fn load(&self) -> Result<Arc<dyn FaceSwapper>, SwapperError> {
        let program = locate_program(&self.config.program, self.config.workdir.as_deref())
            .ok_or_else(|| {
                SwapperError::Initialization(format!(
                    "FACESWAP_PROGRAM '{}' not found",
                    self.config.program
                ))
            })?;

        tracing::info!(
            program = %program.display(),
            execution_provider = %self.config.execution_provider,
            "Face swap toolkit located"
        );

        let swapper = CommandSwapper::new(self.config.clone());

        if let Some(ref warmup) = self.config.warmup_args {
            let args = render_args(warmup, &[]);
            swapper
                .run(&args, "warmup", SwapperError::Initialization)
                .await?;
        }

        Ok(Arc::new(swapper))
    }

    fn model_info(&self) -> ModelInfo {
        adapter_model_info(&self.config)
    }
}
