//! Output image encoding

use std::path::{Path, PathBuf};

use faceswap_core::OutputFormat;
use image::{DynamicImage, ImageFormat};

use crate::swapper::SwapperError;

fn image_format(format: OutputFormat) -> ImageFormat {
    match format.image_encoding() {
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Webp => ImageFormat::WebP,
        _ => ImageFormat::Png,
    }
}

/// Encode `image` to `path` using the still-image encoding of `format`.
///
/// Runs on the blocking pool. JPEG output drops the alpha channel.
pub async fn encode_image(
    image: DynamicImage,
    path: &Path,
    format: OutputFormat,
) -> Result<(), SwapperError> {
    let path: PathBuf = path.to_path_buf();
    let target = image_format(format);

    tokio::task::spawn_blocking(move || {
        let image = match target {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            ImageFormat::WebP => DynamicImage::ImageRgba8(image.to_rgba8()),
            _ => image,
        };
        image.save_with_format(&path, target)
    })
    .await
    .map_err(|e| SwapperError::Swap(format!("Encoding task failed: {}", e)))??;

    Ok(())
}
