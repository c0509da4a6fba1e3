//! # Photo Collage
//!
//! Turns a folder of photos into one framed grid image. Every supported image
//! under the folder is collected, placed in path order into a grid of at most
//! 3x3 cells, resized to the cell size, given a dark blue border, and drawn on
//! a transparent PNG canvas.
//!
//! # Pipeline
//!
//! ```text
//! 1. Collect   folder/   →  ImageSet       (walk, convert HEIF → JPEG)
//! 2. Plan      ImageSet  →  LayoutPlan     (grid shape, canvas geometry)
//! 3. Compose   plan      →  collage.png    (resize, border, paste, encode)
//! ```
//!
//! Planning is pure arithmetic on image counts, so it is tested without
//! touching the filesystem. Collection and compositing go through the
//! [`imaging::ImageBackend`] trait so tests can substitute a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`formats`] | Process-wide registry of readable extensions, split into native and container formats |
//! | [`collect`] | Walks the folder, builds the deduplicated [`collect::ImageSet`] |
//! | [`normalize`] | Converts HEIF-family containers to a sibling JPEG |
//! | [`layout`] | Grid selection and canvas geometry |
//! | [`compose`] | Bordered tiles pasted onto the canvas, PNG encoding |
//! | [`collage`] | End-to-end `survey` / `create_collage` operations |
//! | [`config`] | `collage.toml` loading, merging over stock defaults, validation |
//! | [`imaging`] | Pure-Rust decoding backend (image crate, AV1 via rav1d) |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Path Order Decides Placement
//!
//! Images are ordered by their full path string before placement. The same
//! folder always produces the same collage, and photos named with a date or
//! counter prefix land in the order they were taken.
//!
//! ## At Most Nine Cells
//!
//! The grid never grows past 3x3. A tenth image and beyond are collected and
//! reported but never loaded or drawn.
//!
//! ## Conversion in Place
//!
//! HEIC/HEIF/AVIF files are decoded once and written as a JPEG next to the
//! original, which then stands in for it. A failed conversion skips that one
//! file; the rest of the collage is still built.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding uses the `image` crate and `rav1d` for AV1-coded HEIF items, so the
//! binary has no system library dependencies. HEVC-coded HEIC has no pure-Rust
//! decoder; such files are reported as failed conversions.

pub mod collage;
pub mod collect;
pub mod compose;
pub mod config;
pub mod formats;
pub mod imaging;
pub mod layout;
pub mod normalize;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
