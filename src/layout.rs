//! Grid selection and collage geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Grid policy
//!
//! | Images | Grid (columns × rows) |
//! |---|---|
//! | 1–4 | 2 × 2 |
//! | 5–6 | 3 × 2 |
//! | 7+ | 3 × 3 (images past the ninth are dropped) |
//!
//! ## Geometry
//!
//! Cells are `floor(base × scale)` pixels. A frame of uniform width runs
//! around the canvas edge and between cells:
//!
//! ```text
//! width = columns × cell_width + (columns + 1) × frame_width
//! ```
//!
//! Sizes are computed in `u64` and rejected with a [`LayoutError`] when the
//! canvas or a bordered tile would exceed [`MAX_CANVAS_PIXELS`].

use std::num::NonZeroUsize;
use thiserror::Error;

/// Upper bound on canvas and tile area (1 GiB of RGBA pixels).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// The biggest grid [`select_grid`] can return.
pub const LARGEST_GRID: GridSpec = GridSpec {
    columns: 3,
    rows: 3,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("cell size {width}x{height} is empty")]
    EmptyCell { width: u32, height: u32 },
    #[error("{width}x{height} pixels exceeds the {MAX_CANVAS_PIXELS}-pixel limit")]
    TooLarge { width: u64, height: u64 },
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub columns: u32,
    pub rows: u32,
}

impl GridSpec {
    /// Number of cells in the grid.
    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGeometry {
    pub width: u32,
    pub height: u32,
}

/// Complete geometry for one collage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPlan {
    pub grid: GridSpec,
    pub canvas: CanvasGeometry,
    pub cell: Dimensions,
    pub frame_width: u32,
    /// Images that will actually be placed: `min(count, capacity)`.
    pub cells_used: usize,
}

impl LayoutPlan {
    /// Grid position (column, row) of the `index`-th image, row-major.
    pub fn cell_position(&self, index: usize) -> (u32, u32) {
        let columns = self.grid.columns as usize;
        ((index % columns) as u32, (index / columns) as u32)
    }

    /// Top-left pixel of the `index`-th cell on the canvas.
    ///
    /// Bounded by the canvas size for any index below the grid capacity.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let (col, row) = self.cell_position(index);
        (
            col * self.cell.width + (col + 1) * self.frame_width,
            row * self.cell.height + (row + 1) * self.frame_width,
        )
    }
}

/// Pick the grid for `count` images.
pub fn select_grid(count: NonZeroUsize) -> GridSpec {
    match count.get() {
        1..=4 => GridSpec {
            columns: 2,
            rows: 2,
        },
        5..=6 => GridSpec {
            columns: 3,
            rows: 2,
        },
        _ => LARGEST_GRID,
    }
}

/// Scale a base cell size, truncating toward zero.
pub fn scaled_cell_size(base: Dimensions, scale_factor: f64) -> Dimensions {
    Dimensions {
        width: (base.width as f64 * scale_factor).floor() as u32,
        height: (base.height as f64 * scale_factor).floor() as u32,
    }
}

/// `cells` spans of `cell` pixels with a `frame` gutter on both sides of each.
fn span(cells: u32, cell: u32, frame: u32) -> u64 {
    u64::from(cells) * u64::from(cell) + (u64::from(cells) + 1) * u64::from(frame)
}

fn bounded(width: u64, height: u64) -> Result<Dimensions, LayoutError> {
    let too_large = width > u64::from(u32::MAX)
        || height > u64::from(u32::MAX)
        || width * height > MAX_CANVAS_PIXELS;
    if too_large {
        return Err(LayoutError::TooLarge { width, height });
    }
    Ok(Dimensions::new(width as u32, height as u32))
}

/// Canvas size for a grid of `cell`-sized cells separated by `frame_width`.
pub fn canvas_geometry(
    grid: GridSpec,
    cell: Dimensions,
    frame_width: u32,
) -> Result<CanvasGeometry, LayoutError> {
    let size = bounded(
        span(grid.columns, cell.width, frame_width),
        span(grid.rows, cell.height, frame_width),
    )?;
    Ok(CanvasGeometry {
        width: size.width,
        height: size.height,
    })
}

/// A `cell` padded by `border` pixels on every side.
pub fn tile_size(cell: Dimensions, border: u32) -> Result<Dimensions, LayoutError> {
    let pad = 2 * u64::from(border);
    bounded(u64::from(cell.width) + pad, u64::from(cell.height) + pad)
}

/// Plan the collage for `count` images.
pub fn plan(
    count: NonZeroUsize,
    base: Dimensions,
    scale_factor: f64,
    frame_width: u32,
) -> Result<LayoutPlan, LayoutError> {
    let grid = select_grid(count);
    let cell = scaled_cell_size(base, scale_factor);
    if cell.width == 0 || cell.height == 0 {
        return Err(LayoutError::EmptyCell {
            width: cell.width,
            height: cell.height,
        });
    }
    Ok(LayoutPlan {
        grid,
        canvas: canvas_geometry(grid, cell, frame_width)?,
        cell,
        frame_width,
        cells_used: count.get().min(grid.capacity()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(count: usize) -> NonZeroUsize {
        NonZeroUsize::new(count).unwrap()
    }

    fn default_plan(count: usize) -> LayoutPlan {
        plan(n(count), Dimensions::new(300, 300), 1.0, 10).unwrap()
    }

    #[test]
    fn grid_policy_boundaries() {
        for count in 1..=4 {
            assert_eq!(select_grid(n(count)), GridSpec { columns: 2, rows: 2 }, "{count}");
        }
        for count in 5..=6 {
            assert_eq!(select_grid(n(count)), GridSpec { columns: 3, rows: 2 }, "{count}");
        }
        for count in [7, 8, 9, 10, 50, 1000] {
            assert_eq!(select_grid(n(count)), GridSpec { columns: 3, rows: 3 }, "{count}");
        }
    }

    #[test]
    fn cells_used_caps_at_capacity() {
        assert_eq!(default_plan(1).cells_used, 1);
        assert_eq!(default_plan(4).cells_used, 4);
        assert_eq!(default_plan(6).cells_used, 6);
        assert_eq!(default_plan(9).cells_used, 9);
        assert_eq!(default_plan(10).cells_used, 9);
    }

    #[test]
    fn default_two_column_canvas_is_630() {
        let p = default_plan(3);
        assert_eq!(p.canvas, CanvasGeometry { width: 630, height: 630 });
    }

    #[test]
    fn three_by_two_canvas() {
        let p = default_plan(5);
        // 3*300 + 4*10 by 2*300 + 3*10
        assert_eq!(p.canvas, CanvasGeometry { width: 940, height: 630 });
    }

    #[test]
    fn scale_factor_truncates() {
        let cell = scaled_cell_size(Dimensions::new(300, 200), 0.333);
        // 99.9 and 66.6 floor to 99 and 66
        assert_eq!(cell, Dimensions::new(99, 66));
    }

    #[test]
    fn scaled_non_square_canvas() {
        let p = plan(n(7), Dimensions::new(400, 300), 0.5, 4).unwrap();
        assert_eq!(p.cell, Dimensions::new(200, 150));
        assert_eq!(p.canvas, CanvasGeometry { width: 616, height: 466 });
    }

    #[test]
    fn zero_frame_width() {
        let p = plan(n(2), Dimensions::new(100, 100), 1.0, 0).unwrap();
        assert_eq!(p.canvas, CanvasGeometry { width: 200, height: 200 });
        assert_eq!(p.cell_origin(3), (100, 100));
    }

    #[test]
    fn cell_positions_are_row_major() {
        let p = default_plan(9);
        assert_eq!(p.cell_position(0), (0, 0));
        assert_eq!(p.cell_position(2), (2, 0));
        assert_eq!(p.cell_position(3), (0, 1));
        assert_eq!(p.cell_position(8), (2, 2));
    }

    #[test]
    fn cell_origins_include_frame() {
        let p = default_plan(4);
        assert_eq!(p.cell_origin(0), (10, 10));
        assert_eq!(p.cell_origin(1), (320, 10));
        assert_eq!(p.cell_origin(2), (10, 320));
        assert_eq!(p.cell_origin(3), (320, 320));
    }

    #[test]
    fn huge_scale_factor_is_an_error() {
        let result = plan(n(1), Dimensions::new(300, 300), 1.0e7, 10);
        assert!(matches!(result, Err(LayoutError::TooLarge { .. })));
    }

    #[test]
    fn canvas_past_u32_is_an_error() {
        let cell = Dimensions::new(u32::MAX, 1);
        let err = canvas_geometry(LARGEST_GRID, cell, u32::MAX).unwrap_err();
        assert_eq!(
            err,
            LayoutError::TooLarge {
                width: 3 * u64::from(u32::MAX) + 4 * u64::from(u32::MAX),
                height: 3 + 4 * u64::from(u32::MAX),
            }
        );
    }

    #[test]
    fn canvas_over_pixel_limit_is_an_error() {
        // 3 * 10_000 + 4 * 10 = 30_040 per side, about 902M pixels
        let cell = Dimensions::new(10_000, 10_000);
        assert!(canvas_geometry(LARGEST_GRID, cell, 10).is_err());
        assert!(canvas_geometry(LARGEST_GRID, Dimensions::new(3_000, 3_000), 10).is_ok());
    }

    #[test]
    fn empty_cell_is_an_error() {
        let result = plan(n(3), Dimensions::new(300, 300), 0.001, 10);
        assert_eq!(result, Err(LayoutError::EmptyCell { width: 0, height: 0 }));
    }

    #[test]
    fn tile_size_adds_border_twice() {
        assert_eq!(
            tile_size(Dimensions::new(300, 200), 5),
            Ok(Dimensions::new(310, 210))
        );
    }

    #[test]
    fn oversized_border_is_an_error() {
        let result = tile_size(Dimensions::new(300, 300), u32::MAX);
        assert!(matches!(result, Err(LayoutError::TooLarge { .. })));
    }
}
