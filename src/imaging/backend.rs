//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs
//! from an image library: load a native raster file, and decode a HEIF
//! container down to raw pixel rows.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, statically
//! linked. Tests use the recording mock in `tests::MockBackend`.

use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel layout of a [`RawImage`], 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    L8,
    La8,
    Rgb8,
    Rgba8,
}

impl PixelMode {
    pub fn channels(self) -> usize {
        match self {
            PixelMode::L8 => 1,
            PixelMode::La8 => 2,
            PixelMode::Rgb8 => 3,
            PixelMode::Rgba8 => 4,
        }
    }
}

/// Decoded container pixels before they become an [`image`] buffer.
///
/// Rows start every `stride` bytes; only the first `width * channels` bytes
/// of each row are pixel data; the remainder is decoder padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub mode: PixelMode,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub data: Vec<u8>,
}

impl RawImage {
    /// Tightly packed bytes per row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.mode.channels()
    }
}

/// Trait for image backends.
///
/// The collector and compositor only talk to this trait, so the pipeline can
/// run against a mock that records which files were touched.
pub trait ImageBackend {
    /// Open and decode a native raster file (JPEG, PNG).
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Decode the primary image of a HEIF-family container.
    fn decode_container(&self, path: &Path) -> Result<RawImage, BackendError>;
}
