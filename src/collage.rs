//! The end-to-end collage operation.
//!
//! ```text
//! formats::init → collect (normalize HEIF) → order → plan → compose → PNG
//! ```
//!
//! [`survey`] runs everything up to the layout plan; [`create_collage`] adds
//! compositing. HEIF conversion failures are reported in
//! [`Collection::failures`] and never abort the run; every other failure is
//! returned as a [`CollageError`] and no collage file is written.
//!
//! A file at the output path inside the scanned folder (a previous collage)
//! is left out of the image set, so re-running does not shift cell assignment.

use crate::collect::{Collection, collect};
use crate::compose::{ComposeError, Composition, compose};
use crate::config::CollageConfig;
use crate::formats;
use crate::imaging::{Border, ImageBackend, Quality};
use crate::layout::{Dimensions, LayoutError, LayoutPlan, plan};
use crate::normalize::Normalizer;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollageError {
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),
    #[error("No images found in {}", .0.display())]
    EmptySet(PathBuf),
    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Inputs for one collage run.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageOptions {
    pub folder: PathBuf,
    pub output: PathBuf,
    pub base_image_size: Dimensions,
    pub scale_factor: f64,
    pub frame_width: u32,
    pub border_size: u32,
    pub conversion_quality: Quality,
}

impl CollageOptions {
    /// Options with the stock defaults (300x300 cells, scale 1.0, frame 10, border 5).
    pub fn new(folder: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self::from_config(folder, output, &CollageConfig::default())
    }

    pub fn from_config(
        folder: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        config: &CollageConfig,
    ) -> Self {
        Self {
            folder: folder.into(),
            output: output.into(),
            base_image_size: config.layout.base_size(),
            scale_factor: config.layout.scale_factor,
            frame_width: config.layout.frame_width,
            border_size: config.layout.border_size,
            conversion_quality: config.conversion.quality(),
        }
    }
}

/// Everything known before compositing.
#[derive(Debug)]
pub struct Survey {
    pub collection: Collection,
    /// Images in cell order; only the first `plan.cells_used` are placed.
    pub ordered: Vec<PathBuf>,
    pub plan: LayoutPlan,
}

impl Survey {
    /// Images that did not fit in the grid.
    pub fn dropped(&self) -> &[PathBuf] {
        &self.ordered[self.plan.cells_used..]
    }
}

/// Result of a finished collage.
#[derive(Debug)]
pub struct CollageReport {
    pub survey: Survey,
    pub composition: Composition,
}

/// Collect, order and plan without writing a collage.
///
/// HEIF images are still converted, since their JPEG paths take part in the
/// ordering.
pub fn survey(backend: &impl ImageBackend, options: &CollageOptions) -> Result<Survey, CollageError> {
    let registry = formats::init();
    let folder = options.folder.as_path();
    if !folder.is_dir() {
        return Err(CollageError::FolderNotFound(folder.to_path_buf()));
    }

    let normalizer = Normalizer::new(backend, options.conversion_quality);
    let mut collection = collect(folder, registry, &normalizer);
    exclude_output(&mut collection, &options.output);

    let count = NonZeroUsize::new(collection.images.len())
        .ok_or_else(|| CollageError::EmptySet(folder.to_path_buf()))?;
    let ordered = collection.images.ordered();
    let plan = plan(
        count,
        options.base_image_size,
        options.scale_factor,
        options.frame_width,
    )?;

    tracing::debug!(
        columns = plan.grid.columns,
        rows = plan.grid.rows,
        width = plan.canvas.width,
        height = plan.canvas.height,
        cells_used = plan.cells_used,
        "planned layout"
    );

    Ok(Survey {
        collection,
        ordered,
        plan,
    })
}

/// Build the collage described by `options` and write it to `options.output`.
pub fn create_collage(
    backend: &impl ImageBackend,
    options: &CollageOptions,
) -> Result<CollageReport, CollageError> {
    let survey = survey(backend, options)?;
    let composition = compose(
        backend,
        &survey.ordered,
        &survey.plan,
        Border::new(options.border_size),
        &options.output,
    )?;
    Ok(CollageReport {
        survey,
        composition,
    })
}

/// Drop a previous collage that sits inside the scanned folder.
fn exclude_output(collection: &mut Collection, output: &Path) {
    let Ok(target) = output.canonicalize() else {
        return;
    };
    collection.images.retain(|p| {
        let keep = p.canonicalize().map_or(true, |c| c != target);
        if !keep {
            tracing::debug!(path = %p.display(), "ignoring previous collage output");
        }
        keep
    });
}

/// `path` relative to `root` when it lives under it.
pub fn display_path<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
