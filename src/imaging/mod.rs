//! Image I/O in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::ImageReader` (JPEG, PNG) |
//! | **HEIF decode** | `avif-parse` + `rav1d`, see [`rust_backend`] |
//!
//! The module is split into:
//! - **Parameters**: [`Quality`] and [`Border`] values chosen by the pipeline
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, PixelMode, RawImage};
pub use params::{BORDER_COLOR, Border, Quality};
pub use rust_backend::RustBackend;
