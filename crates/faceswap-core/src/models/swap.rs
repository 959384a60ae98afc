use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OutputFormat;
use crate::error::AppError;

/// Options accepted alongside the uploaded files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SwapParameters {
    pub output_format: OutputFormat,
    pub keep_frames: bool,
    pub keep_fps: bool,
    pub many_faces: bool,
    pub skip_audio: bool,
    pub use_cloud_storage: bool,
}

impl Default for SwapParameters {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Mp4,
            keep_frames: false,
            keep_fps: true,
            many_faces: false,
            skip_audio: false,
            use_cloud_storage: true,
        }
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid parameters: {} must be a boolean, got '{}'",
            field,
            value.trim()
        ))),
    }
}

impl SwapParameters {
    /// Apply one multipart text field. Unknown field names are ignored.
    pub fn apply_field(&mut self, name: &str, value: &str) -> Result<(), AppError> {
        match name {
            "output_format" => self.output_format = OutputFormat::parse_lenient(value),
            "keep_frames" => self.keep_frames = parse_flag(name, value)?,
            "keep_fps" => self.keep_fps = parse_flag(name, value)?,
            "many_faces" => self.many_faces = parse_flag(name, value)?,
            "skip_audio" => self.skip_audio = parse_flag(name, value)?,
            "use_cloud_storage" => self.use_cloud_storage = parse_flag(name, value)?,
            _ => {}
        }
        Ok(())
    }
}
