//! Synthetic face-like test image used by the benchmark endpoint

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

const BACKGROUND: Rgb<u8> = Rgb([235, 235, 235]);
const SKIN: Rgb<u8> = Rgb([224, 172, 105]);
const FEATURE: Rgb<u8> = Rgb([40, 30, 30]);
const MOUTH: Rgb<u8> = Rgb([150, 50, 60]);

/// Draw a `size`×`size` image with a face-like arrangement of shapes.
pub fn synthetic_face(size: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(size, size, BACKGROUND);
    let s = size as i32;
    let center = (s / 2, s / 2);

    draw_filled_ellipse_mut(&mut img, center, s * 3 / 10, s * 2 / 5, SKIN);

    let eye_y = s * 2 / 5;
    let eye_radius = (s / 20).max(1);
    draw_filled_circle_mut(&mut img, (s * 2 / 5, eye_y), eye_radius, FEATURE);
    draw_filled_circle_mut(&mut img, (s * 3 / 5, eye_y), eye_radius, FEATURE);

    let mouth_width = (size * 3 / 10).max(1);
    let mouth_height = (size / 20).max(1);
    draw_filled_rect_mut(
        &mut img,
        Rect::at(s * 7 / 20, s * 13 / 20).of_size(mouth_width, mouth_height),
        MOUTH,
    );

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_face_dimensions_and_features() {
        let img = synthetic_face(100);
        assert_eq!(img.dimensions(), (100, 100));
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*img.get_pixel(40, 40), FEATURE);
        assert_eq!(*img.get_pixel(50, 66), MOUTH);
        assert_eq!(*img.get_pixel(50, 50), SKIN);
    }
}
