//! HEIF → JPEG normalization.
//!
//! A container image is decoded by the backend into a [`RawImage`], rebuilt
//! as an `image` buffer (dropping any row padding) and written next to the
//! source with the extension swapped for [`NORMALIZED_EXTENSION`]:
//!
//! ```text
//! trip/IMG_0042.HEIC  →  trip/IMG_0042.jpg
//! ```
//!
//! The source file is never touched. An existing file at the output path is
//! overwritten, so normalizing twice leaves exactly one converted file.

use crate::formats::NORMALIZED_EXTENSION;
use crate::imaging::{BackendError, ImageBackend, PixelMode, Quality, RawImage};
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single container file that could not be converted.
///
/// Collectors skip the file and keep going; see [`crate::collect`].
#[derive(Error, Debug)]
#[error("Failed to convert {}: {source}", path.display())]
pub struct ConversionError {
    pub path: PathBuf,
    #[source]
    pub source: BackendError,
}

/// Converts container images through an [`ImageBackend`].
pub struct Normalizer<'a, B: ImageBackend> {
    backend: &'a B,
    quality: Quality,
}

impl<'a, B: ImageBackend> Normalizer<'a, B> {
    pub fn new(backend: &'a B, quality: Quality) -> Self {
        Self { backend, quality }
    }

    /// Convert `input` and return the path of the written JPEG.
    pub fn normalize(&self, input: &Path) -> Result<PathBuf, ConversionError> {
        let output = normalized_path(input);
        let fail = |source| ConversionError {
            path: input.to_path_buf(),
            source,
        };

        let raw = self.backend.decode_container(input).map_err(fail)?;
        let image = reconstruct(raw).map_err(fail)?;
        save_jpeg(&image, &output, self.quality).map_err(fail)?;

        tracing::debug!(
            source = %input.display(),
            output = %output.display(),
            width = image.width(),
            height = image.height(),
            "converted container image"
        );
        Ok(output)
    }
}

/// Sibling path with the extension replaced by [`NORMALIZED_EXTENSION`].
pub fn normalized_path(input: &Path) -> PathBuf {
    input.with_extension(NORMALIZED_EXTENSION)
}

/// Rebuild a standard image from raw decoder rows.
pub fn reconstruct(raw: RawImage) -> Result<DynamicImage, BackendError> {
    let row_bytes = raw.row_bytes();
    let height = raw.height as usize;

    if raw.width == 0 || raw.height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Empty image ({}x{})",
            raw.width, raw.height
        )));
    }
    if raw.stride < row_bytes {
        return Err(BackendError::ProcessingFailed(format!(
            "Stride {} shorter than row of {} bytes",
            raw.stride, row_bytes
        )));
    }
    let needed = raw.stride * (height - 1) + row_bytes;
    if raw.data.len() < needed {
        return Err(BackendError::ProcessingFailed(format!(
            "Pixel buffer holds {} bytes, {} needed",
            raw.data.len(),
            needed
        )));
    }

    let packed = if raw.stride == row_bytes {
        let mut data = raw.data;
        data.truncate(row_bytes * height);
        data
    } else {
        raw.data
            .chunks(raw.stride)
            .take(height)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    };

    let (w, h) = (raw.width, raw.height);
    let image = match raw.mode {
        PixelMode::L8 => GrayImage::from_raw(w, h, packed).map(DynamicImage::ImageLuma8),
        PixelMode::La8 => GrayAlphaImage::from_raw(w, h, packed).map(DynamicImage::ImageLumaA8),
        PixelMode::Rgb8 => RgbImage::from_raw(w, h, packed).map(DynamicImage::ImageRgb8),
        PixelMode::Rgba8 => RgbaImage::from_raw(w, h, packed).map(DynamicImage::ImageRgba8),
    };
    image.ok_or_else(|| {
        BackendError::ProcessingFailed("Failed to create image from raw pixel data".into())
    })
}

/// Encode as JPEG. Alpha is dropped since JPEG cannot carry it.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let flattened;
    let img = if img.color().has_alpha() {
        flattened = DynamicImage::ImageRgb8(img.to_rgb8());
        &flattened
    } else {
        img
    };

    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.value() as u8);
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}
