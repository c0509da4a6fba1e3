//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. The collector and
//! compositor decide the values; the [`backend`](super::backend) and the
//! pixel helpers consume them.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality for converted HEIF images (1–100, default 90). Clamped on construction.
//! - [`Border`]: solid decorative border drawn around every collage cell.

use image::Rgba;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Opaque dark blue used for every cell border.
pub const BORDER_COLOR: Rgba<u8> = Rgba([0, 0, 128, 255]);

/// Uniform border added on all four sides of a cell image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    /// Border thickness in pixels.
    pub size: u32,
    pub color: Rgba<u8>,
}

impl Border {
    /// A border of `size` pixels in the standard [`BORDER_COLOR`].
    pub fn new(size: u32) -> Self {
        Self {
            size,
            color: BORDER_COLOR,
        }
    }
}
