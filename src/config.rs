//! Collage configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. stock defaults (below)
//! 2. `collage.toml` in the scanned folder, or a file passed with `--config`
//! 3. command-line flags
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! base_image_size = [300, 300]  # cell size before scaling, [width, height]
//! scale_factor = 1.0            # cell size multiplier (result is floored)
//! frame_width = 10              # gap between cells and around the edge
//! border_size = 5               # dark blue border drawn around each image
//!
//! [conversion]
//! quality = 90                  # JPEG quality for converted HEIF images (1-100)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::Quality;
use crate::layout::{Dimensions, LARGEST_GRID, canvas_geometry, scaled_cell_size, tile_size};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up inside the scanned folder.
pub const CONFIG_FILENAME: &str = "collage.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Collage configuration loaded from `collage.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageConfig {
    /// Grid geometry and cell decoration.
    pub layout: LayoutConfig,
    /// HEIF → JPEG conversion settings.
    pub conversion: ConversionConfig,
}

impl CollageConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [width, height] = self.layout.base_image_size;
        if width == 0 || height == 0 {
            return Err(ConfigError::Validation(
                "layout.base_image_size values must be non-zero".into(),
            ));
        }
        let scale = self.layout.scale_factor;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::Validation(
                "layout.scale_factor must be a positive number".into(),
            ));
        }
        let cell = self.layout.cell_size();
        if cell.width == 0 || cell.height == 0 {
            return Err(ConfigError::Validation(format!(
                "layout.scale_factor {scale} shrinks {width}x{height} cells below one pixel"
            )));
        }
        canvas_geometry(LARGEST_GRID, cell, self.layout.frame_width)
            .map_err(|e| ConfigError::Validation(format!("layout: canvas of {e}")))?;
        tile_size(cell, self.layout.border_size)
            .map_err(|e| ConfigError::Validation(format!("layout: bordered cell of {e}")))?;
        if !(1..=100).contains(&self.conversion.quality) {
            return Err(ConfigError::Validation(
                "conversion.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// Grid geometry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Cell size before scaling, `[width, height]` in pixels.
    pub base_image_size: [u32; 2],
    /// Multiplier applied to `base_image_size`.
    pub scale_factor: f64,
    /// Gutter between cells and around the canvas edge, in pixels.
    pub frame_width: u32,
    /// Decorative border drawn around each image, in pixels.
    pub border_size: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_image_size: [300, 300],
            scale_factor: 1.0,
            frame_width: 10,
            border_size: 5,
        }
    }
}

impl LayoutConfig {
    pub fn base_size(&self) -> Dimensions {
        Dimensions::new(self.base_image_size[0], self.base_image_size[1])
    }

    /// Final cell size after scaling.
    pub fn cell_size(&self) -> Dimensions {
        scaled_cell_size(self.base_size(), self.scale_factor)
    }
}

/// HEIF conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

impl ConversionConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CollageConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<CollageConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CollageConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<CollageConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load `collage.toml` from `folder`, falling back to defaults when absent.
pub fn load_config(folder: &Path) -> Result<CollageConfig, ConfigError> {
    let path = folder.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `collage.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-collage configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as collage.toml in the folder you scan, or pass it
# with --config. Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
# The grid is picked from the image count: up to 4 images use 2x2,
# 5-6 use 3x2, and 7 or more use 3x3 (only the first 9 are placed).
[layout]
# Cell size before scaling, [width, height] in pixels.
base_image_size = [300, 300]

# Cell size multiplier. The scaled size is rounded down.
scale_factor = 1.0

# Transparent gap between cells and around the canvas edge, in pixels.
frame_width = 10

# Dark blue border drawn around every image, in pixels.
border_size = 5

# ---------------------------------------------------------------------------
# Conversion
# ---------------------------------------------------------------------------
# HEIC/HEIF/AVIF images are converted to a JPEG next to the original
# before they are placed.
[conversion]
# JPEG quality, 1 (smallest) to 100 (best).
quality = 90
"##
}
