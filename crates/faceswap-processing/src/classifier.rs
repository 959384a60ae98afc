//! Content-based media classification
//!
//! Uploaded files are classified by what they contain, never by their name.
//! Images must both carry a known signature and decode a header with valid
//! dimensions. Videos are recognized by container signatures in a bounded
//! prefix of the file.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use faceswap_core::MediaKind;
use image::ImageReader;

/// Bytes read from the head of a file for container sniffing
const SNIFF_PREFIX_LEN: u64 = 4096;
const MPEG_TS_PACKET_LEN: usize = 188;

/// ISO-BMFF brands that describe still images rather than video
const STILL_IMAGE_BRANDS: &[&[u8; 4]] = &[b"avif", b"avis", b"heic", b"heix", b"mif1", b"msf1"];

/// A staged file together with its classification
#[derive(Debug, Clone)]
pub struct MediaDescriptor {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub dimensions: Option<(u32, u32)>,
    pub size_bytes: u64,
}

impl MediaDescriptor {
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MediaClassifier;

impl MediaClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a file on the blocking pool. Never fails: anything that cannot
    /// be read or recognized is `Invalid`.
    pub async fn classify(&self, path: &Path) -> MediaDescriptor {
        let owned = path.to_path_buf();
        match tokio::task::spawn_blocking(move || classify_path(&owned)).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Classification task failed");
                MediaDescriptor {
                    path: path.to_path_buf(),
                    kind: MediaKind::Invalid,
                    dimensions: None,
                    size_bytes: 0,
                }
            }
        }
    }
}

/// Synchronous classification
pub fn classify_path(path: &Path) -> MediaDescriptor {
    let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    let (kind, dimensions) = if let Some(dims) = image_dimensions(path) {
        (MediaKind::Image, Some(dims))
    } else if read_prefix(path).is_some_and(|prefix| is_video_signature(&prefix)) {
        (MediaKind::Video, None)
    } else {
        (MediaKind::Invalid, None)
    };

    tracing::debug!(
        path = %path.display(),
        kind = %kind,
        size_bytes = size_bytes,
        "Classified media"
    );

    MediaDescriptor {
        path: path.to_path_buf(),
        kind,
        dimensions,
        size_bytes,
    }
}

fn image_dimensions(path: &Path) -> Option<(u32, u32)> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    reader.format()?;
    let (width, height) = reader.into_dimensions().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

fn read_prefix(path: &Path) -> Option<Vec<u8>> {
    let file = File::open(path).ok()?;
    let mut prefix = Vec::with_capacity(SNIFF_PREFIX_LEN as usize);
    file.take(SNIFF_PREFIX_LEN).read_to_end(&mut prefix).ok()?;
    Some(prefix)
}

/// Match well-known video container signatures
pub fn is_video_signature(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }

    // ISO-BMFF (mp4, mov, m4v, 3gp): size(4) + box type(4)
    match &data[4..8] {
        b"ftyp" => {
            let brand: &[u8] = &data[8..12];
            return !STILL_IMAGE_BRANDS.iter().any(|b| &b[..] == brand);
        }
        b"moov" | b"mdat" | b"wide" | b"free" | b"skip" => return true,
        _ => {}
    }

    // EBML (webm, mkv)
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return true;
    }

    // RIFF AVI
    if &data[0..4] == b"RIFF" && &data[8..12] == b"AVI " {
        return true;
    }

    // FLV
    if data.starts_with(b"FLV\x01") {
        return true;
    }

    // ASF / WMV
    if data.starts_with(&[0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11]) {
        return true;
    }

    // MPEG program stream / elementary video stream
    if data.starts_with(&[0x00, 0x00, 0x01, 0xBA]) || data.starts_with(&[0x00, 0x00, 0x01, 0xB3])
    {
        return true;
    }

    // MPEG transport stream: sync byte repeated every packet
    if data[0] == 0x47 && data.len() > MPEG_TS_PACKET_LEN && data[MPEG_TS_PACKET_LEN] == 0x47 {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 6, Rgb([200, 120, 90]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn mp4_header() -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x00, 0x20];
        data.extend_from_slice(b"ftypisom");
        data.extend_from_slice(&[0u8; 64]);
        data
    }

    #[test]
    fn test_png_is_image_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, png_bytes()).unwrap();

        let descriptor = classify_path(&path);
        assert_eq!(descriptor.kind, MediaKind::Image);
        assert_eq!(descriptor.dimensions, Some((8, 6)));
    }

    #[test]
    fn test_mp4_signature_is_video_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, mp4_header()).unwrap();

        assert_eq!(classify_path(&path).kind, MediaKind::Video);
    }

    #[test]
    fn test_text_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.jpg");
        std::fs::write(&path, b"this is not an image at all").unwrap();

        assert_eq!(classify_path(&path).kind, MediaKind::Invalid);
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let descriptor = classify_path(Path::new("/definitely/not/here.png"));
        assert_eq!(descriptor.kind, MediaKind::Invalid);
        assert_eq!(descriptor.size_bytes, 0);
    }

    #[test]
    fn test_truncated_png_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, &png_bytes()[..10]).unwrap();

        assert_eq!(classify_path(&path).kind, MediaKind::Invalid);
    }

    #[test]
    fn test_container_signatures() {
        let mut webm = vec![0x1A, 0x45, 0xDF, 0xA3];
        webm.extend_from_slice(&[0u8; 16]);
        assert!(is_video_signature(&webm));

        let mut avi = b"RIFF".to_vec();
        avi.extend_from_slice(&[0u8; 4]);
        avi.extend_from_slice(b"AVI LIST");
        assert!(is_video_signature(&avi));

        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0u8; 4]);
        webp.extend_from_slice(b"WEBPVP8 ");
        assert!(!is_video_signature(&webp));

        let mut avif = vec![0x00, 0x00, 0x00, 0x1C];
        avif.extend_from_slice(b"ftypavif");
        avif.extend_from_slice(&[0u8; 16]);
        assert!(!is_video_signature(&avif));

        let mut ts = vec![0u8; MPEG_TS_PACKET_LEN * 2];
        ts[0] = 0x47;
        ts[MPEG_TS_PACKET_LEN] = 0x47;
        assert!(is_video_signature(&ts));
    }

    #[tokio::test]
    async fn test_async_classify_runs_on_blocking_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source");
        std::fs::write(&path, png_bytes()).unwrap();

        let descriptor = MediaClassifier::new().classify(&path).await;
        assert!(descriptor.is_image());
        assert!(descriptor.size_bytes > 0);
    }
}
