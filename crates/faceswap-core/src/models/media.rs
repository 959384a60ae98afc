use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content-derived classification of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Invalid,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Invalid => "invalid",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Requested output encoding.
///
/// Video containers and still-image encodings share one request field. The
/// effective format depends on the target kind, see [`OutputFormat::video_container`]
/// and [`OutputFormat::image_encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Webm,
    Mov,
    Avi,
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// Parse a user-supplied value. Unrecognized values coerce to the default.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().trim_start_matches('.').to_lowercase().as_str() {
            "mp4" => OutputFormat::Mp4,
            "webm" => OutputFormat::Webm,
            "mov" => OutputFormat::Mov,
            "avi" => OutputFormat::Avi,
            "png" => OutputFormat::Png,
            "jpg" | "jpeg" => OutputFormat::Jpeg,
            "webp" => OutputFormat::Webp,
            _ => OutputFormat::default(),
        }
    }

    pub fn is_video_container(&self) -> bool {
        matches!(
            self,
            OutputFormat::Mp4 | OutputFormat::Webm | OutputFormat::Mov | OutputFormat::Avi
        )
    }

    /// Container used when the target is a video
    pub fn video_container(self) -> Self {
        if self.is_video_container() {
            self
        } else {
            OutputFormat::Mp4
        }
    }

    /// Encoding used when the target is a still image
    pub fn image_encoding(self) -> Self {
        if self.is_video_container() {
            OutputFormat::Png
        } else {
            self
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
            OutputFormat::Mov => "mov",
            OutputFormat::Avi => "avi",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "video/mp4",
            OutputFormat::Webm => "video/webm",
            OutputFormat::Mov => "video/quicktime",
            OutputFormat::Avi => "video/x-msvideo",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}
