//! Test fixtures: small encoded images and container headers.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    buf.into_inner()
}

/// 64x64 PNG with a gradient and a dark blob, recognized as a face by the
/// fake swapper.
pub fn face_png() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 64, |x, y| {
        let dx = x as i32 - 32;
        let dy = y as i32 - 32;
        if dx * dx + dy * dy < 200 {
            Rgb([40, 30, 30])
        } else {
            Rgb([(x * 4) as u8, (y * 4) as u8, 160])
        }
    });
    encode_png(&img)
}

/// 64x64 PNG of a single colour, which holds no face.
pub fn blank_png() -> Vec<u8> {
    encode_png(&RgbImage::from_pixel(64, 64, Rgb([128, 128, 128])))
}

/// ISO-BMFF header followed by padding.
pub fn mp4_header() -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x20];
    data.extend_from_slice(b"ftypisom");
    data.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
    data.extend_from_slice(b"isomiso2avc1mp41");
    data.extend_from_slice(&[0u8; 256]);
    data
}

pub fn text_bytes() -> Vec<u8> {
    b"definitely not an image\n".to_vec()
}
