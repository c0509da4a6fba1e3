//! Shared test utilities for the photo-collage test suite.
//!
//! Fixture images are generated on the fly with the `image` crate so tests
//! never depend on binary files in the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("a.jpg"), 64, 48);
//! create_test_avif(&tmp.path().join("b.heic"), 64, 48);
//! ```

use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, Rgba};
use std::path::Path;

// =========================================================================
// Fixture images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG with a gradient pattern.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG with a gradient pattern.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write an AV1-coded HEIF container (what `.avif` files are).
///
/// The container bytes do not depend on the file name, so this also stands
/// in for `.heic`/`.heif` inputs.
pub fn create_test_avif(path: &Path, width: u32, height: u32) {
    let dynamic = DynamicImage::ImageRgb8(gradient(width, height));
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 10, 85);
    dynamic.write_with_encoder(encoder).unwrap();
}

/// Create an empty file, making parent directories as needed.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Assert two pixels match within resampling/blending rounding (±2 per channel).
pub fn assert_color_near(actual: Rgba<u8>, expected: Rgba<u8>) {
    let close = actual
        .0
        .iter()
        .zip(expected.0.iter())
        .all(|(a, e)| a.abs_diff(*e) <= 2);
    assert!(close, "pixel {actual:?} not within 2 of {expected:?}");
}
