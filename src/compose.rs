//! Collage compositing.
//!
//! For each image in order, up to [`LayoutPlan::cells_used`]:
//!
//! 1. load it through the backend
//! 2. resize to exactly the cell size (Lanczos3)
//! 3. surround it with a solid [`Border`]
//! 4. paste it onto the canvas at [`LayoutPlan::cell_origin`], masked by its
//!    own alpha
//!
//! The mask blends every channel linearly, alpha included, rather than
//! Porter-Duff "over": a half-transparent red pixel on the transparent white
//! canvas becomes roughly `(255, 127, 127, 64)`. Opaque pixels are copied
//! as-is.
//!
//! The canvas starts fully transparent and is written as PNG once, after the
//! last image is placed. Images past the grid capacity are never opened. If
//! any image fails to load, nothing is written.

use crate::imaging::{BackendError, Border, ImageBackend};
use crate::layout::{Dimensions, LayoutError, LayoutPlan, tile_size};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Canvas fill: white with zero alpha.
pub const CANVAS_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 0]);

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to load {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Failed to write collage {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Bordered tile too large: {0}")]
    Tile(#[from] LayoutError),
}

/// Where one image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub path: PathBuf,
    pub column: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
}

/// Result of a successful compose.
#[derive(Debug, Clone)]
pub struct Composition {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

/// Build the collage from `ordered` paths and write it to `output`.
pub fn compose(
    backend: &impl ImageBackend,
    ordered: &[PathBuf],
    plan: &LayoutPlan,
    border: Border,
    output: &Path,
) -> Result<Composition, ComposeError> {
    let (canvas, placements) = render(backend, ordered, plan, border)?;

    canvas
        .save_with_format(output, ImageFormat::Png)
        .map_err(|source| ComposeError::Encode {
            path: output.to_path_buf(),
            source,
        })?;

    tracing::info!(
        output = %output.display(),
        width = canvas.width(),
        height = canvas.height(),
        placed = placements.len(),
        "collage written"
    );

    Ok(Composition {
        output: output.to_path_buf(),
        width: canvas.width(),
        height: canvas.height(),
        placements,
    })
}

/// Paint every placed image onto a fresh canvas, in memory.
pub fn render(
    backend: &impl ImageBackend,
    ordered: &[PathBuf],
    plan: &LayoutPlan,
    border: Border,
) -> Result<(RgbaImage, Vec<Placement>), ComposeError> {
    let mut canvas = RgbaImage::from_pixel(plan.canvas.width, plan.canvas.height, CANVAS_BACKGROUND);
    let mut placements = Vec::with_capacity(plan.cells_used);

    for (index, path) in ordered.iter().take(plan.cells_used).enumerate() {
        let img = backend.load(path).map_err(|source| ComposeError::ImageLoad {
            path: path.clone(),
            source,
        })?;
        let tile = bordered_tile(&img, plan.cell, border)?;

        let (column, row) = plan.cell_position(index);
        let (x, y) = plan.cell_origin(index);
        paste_masked(&mut canvas, &tile, x, y);

        tracing::debug!(path = %path.display(), column, row, x, y, "placed image");
        placements.push(Placement {
            path: path.clone(),
            column,
            row,
            x,
            y,
        });
    }

    Ok((canvas, placements))
}

/// Resize to exactly `cell` and pad with `border` on every side.
///
/// The resized pixels replace the border fill as-is, so transparent source
/// pixels stay transparent in the tile.
pub fn bordered_tile(
    img: &DynamicImage,
    cell: Dimensions,
    border: Border,
) -> Result<RgbaImage, LayoutError> {
    let size = tile_size(cell, border.size)?;
    let resized = img
        .resize_exact(cell.width, cell.height, FilterType::Lanczos3)
        .to_rgba8();

    let mut tile = RgbaImage::from_pixel(size.width, size.height, border.color);
    imageops::replace(
        &mut tile,
        &resized,
        i64::from(border.size),
        i64::from(border.size),
    );
    Ok(tile)
}

/// Paste `tile` with its top-left corner at (`x`, `y`), clipped to the canvas.
fn paste_masked(canvas: &mut RgbaImage, tile: &RgbaImage, x: u32, y: u32) {
    let width = tile.width().min(canvas.width().saturating_sub(x));
    let height = tile.height().min(canvas.height().saturating_sub(y));
    for ty in 0..height {
        for tx in 0..width {
            blend_masked(canvas.get_pixel_mut(x + tx, y + ty), tile.get_pixel(tx, ty));
        }
    }
}

/// `dst = src * a + dst * (1 - a)` on every channel, `a` being the source alpha.
fn blend_masked(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    let mask = u32::from(src[3]);
    for (d, s) in dst.0.iter_mut().zip(src.0) {
        *d = ((u32::from(s) * mask + u32::from(*d) * (255 - mask) + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::{BORDER_COLOR, RustBackend};
    use crate::layout::plan;
    use crate::test_helpers::{assert_color_near, create_test_png};
    use std::num::NonZeroUsize;
    use tempfile::TempDir;

    fn paths(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| PathBuf::from(format!("/photos/{i:02}.jpg")))
            .collect()
    }

    fn small_plan(count: usize) -> LayoutPlan {
        plan(
            NonZeroUsize::new(count).unwrap(),
            Dimensions::new(20, 20),
            1.0,
            10,
        )
        .unwrap()
    }

    #[test]
    fn bordered_tile_dimensions_and_colors() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(7, 3, Rgba([10, 200, 10, 255])));
        let tile = bordered_tile(&img, Dimensions::new(20, 10), Border::new(5)).unwrap();

        assert_eq!(tile.dimensions(), (30, 20));
        assert_eq!(*tile.get_pixel(0, 0), BORDER_COLOR);
        assert_eq!(*tile.get_pixel(29, 19), BORDER_COLOR);
        assert_eq!(*tile.get_pixel(4, 10), BORDER_COLOR);
        assert_color_near(*tile.get_pixel(15, 10), Rgba([10, 200, 10, 255]));
    }

    #[test]
    fn bordered_tile_zero_border() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        let tile = bordered_tile(&img, Dimensions::new(8, 8), Border::new(0)).unwrap();
        assert_eq!(tile.dimensions(), (8, 8));
        assert_color_near(*tile.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn bordered_tile_keeps_source_transparency() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let tile = bordered_tile(&img, Dimensions::new(4, 4), Border::new(2)).unwrap();
        assert_eq!(tile.get_pixel(4, 4)[3], 0);
        assert_eq!(*tile.get_pixel(0, 0), BORDER_COLOR);
    }

    #[test]
    fn bordered_tile_rejects_oversized_border() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let result = bordered_tile(&img, Dimensions::new(4, 4), Border::new(u32::MAX));
        assert!(matches!(result, Err(LayoutError::TooLarge { .. })));
    }

    #[test]
    fn masked_paste_blends_alpha_channel_too() {
        let mut canvas = RgbaImage::from_pixel(4, 4, CANVAS_BACKGROUND);
        let tile = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 128]));
        paste_masked(&mut canvas, &tile, 1, 1);

        assert_color_near(*canvas.get_pixel(1, 1), Rgba([255, 127, 127, 64]));
        assert_eq!(*canvas.get_pixel(0, 0), CANVAS_BACKGROUND);
        assert_eq!(*canvas.get_pixel(3, 3), CANVAS_BACKGROUND);
    }

    #[test]
    fn masked_paste_copies_opaque_and_skips_transparent() {
        let mut canvas = RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 200]));
        let mut tile = RgbaImage::new(2, 1);
        tile.put_pixel(0, 0, BORDER_COLOR);
        tile.put_pixel(1, 0, Rgba([255, 0, 0, 0]));
        paste_masked(&mut canvas, &tile, 0, 0);

        assert_eq!(*canvas.get_pixel(0, 0), BORDER_COLOR);
        assert_eq!(*canvas.get_pixel(1, 0), Rgba([9, 9, 9, 200]));
    }

    #[test]
    fn masked_paste_clips_at_canvas_edge() {
        let mut canvas = RgbaImage::from_pixel(3, 3, CANVAS_BACKGROUND);
        let tile = RgbaImage::from_pixel(4, 4, BORDER_COLOR);
        paste_masked(&mut canvas, &tile, 2, 2);
        assert_eq!(*canvas.get_pixel(2, 2), BORDER_COLOR);
        assert_eq!(*canvas.get_pixel(1, 1), CANVAS_BACKGROUND);
    }

    #[test]
    fn render_places_images_on_transparent_canvas() {
        let backend = MockBackend::new();
        let p = small_plan(3);
        let (canvas, placements) =
            render(&backend, &paths(3), &p, Border::new(2)).unwrap();

        assert_eq!(canvas.dimensions(), (70, 70));
        // Gutter before the first cell stays untouched
        assert_eq!(*canvas.get_pixel(0, 0), CANVAS_BACKGROUND);
        // Border at the cell origin
        assert_color_near(*canvas.get_pixel(10, 10), BORDER_COLOR);
        // Image body inside the border
        assert_color_near(*canvas.get_pixel(20, 20), backend.load_color);
        // Fourth cell is empty
        assert_eq!(*canvas.get_pixel(55, 55), CANVAS_BACKGROUND);

        let origins: Vec<(u32, u32)> = placements.iter().map(|pl| (pl.x, pl.y)).collect();
        assert_eq!(origins, vec![(10, 10), (40, 10), (10, 40)]);
    }

    #[test]
    fn render_stops_at_grid_capacity() {
        let backend = MockBackend::new();
        let all = paths(10);
        let p = small_plan(all.len());
        let (_, placements) = render(&backend, &all, &p, Border::new(1)).unwrap();

        assert_eq!(placements.len(), 9);
        let loaded = backend.loaded_paths();
        assert_eq!(loaded.len(), 9);
        assert!(!loaded.contains(&"/photos/09.jpg".to_string()));
    }

    #[test]
    fn load_failure_aborts_without_output() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("collage.png");
        let all = paths(3);
        let backend = MockBackend::new().failing_on(&all[1]);

        let err = compose(&backend, &all, &small_plan(3), Border::new(1), &output).unwrap_err();
        assert!(matches!(err, ComposeError::ImageLoad { ref path, .. } if path == &all[1]));
        assert!(!output.exists());
        // Third image never attempted
        assert_eq!(backend.loaded_paths().len(), 2);
    }

    #[test]
    fn compose_writes_png_with_alpha() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("collage.png");
        let backend = MockBackend::new();

        let composition =
            compose(&backend, &paths(5), &small_plan(5), Border::new(2), &output).unwrap();
        assert_eq!((composition.width, composition.height), (100, 70));

        let written = image::open(&output).unwrap();
        assert!(written.color().has_alpha());
        assert_eq!((written.width(), written.height()), (100, 70));
        assert_eq!(written.to_rgba8().get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn encode_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("missing-dir/collage.png");
        let result = compose(
            &MockBackend::new(),
            &paths(1),
            &small_plan(1),
            Border::new(1),
            &output,
        );
        assert!(matches!(result, Err(ComposeError::Encode { .. })));
    }

    #[test]
    fn compose_from_real_files() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.png");
        let b = tmp.path().join("b.png");
        create_test_png(&a, 50, 30);
        create_test_png(&b, 10, 40);
        let output = tmp.path().join("out.png");

        let composition = compose(
            &RustBackend::new(),
            &[a, b],
            &small_plan(2),
            Border::new(3),
            &output,
        )
        .unwrap();
        assert_eq!(composition.placements.len(), 2);
        assert_eq!(image::image_dimensions(&output).unwrap(), (70, 70));
    }
}
