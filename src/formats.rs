//! Process-wide registry of the file extensions the pipeline understands.
//!
//! Extensions fall into two groups:
//!
//! | Kind | Extensions | Handling |
//! |---|---|---|
//! | [`FormatKind::Native`] | `jpg`, `jpeg`, `png` | used as-is |
//! | [`FormatKind::Container`] | `heic`, `heif`, `avif` | converted to JPEG first |
//!
//! Native extensions are only registered when the compiled-in `image`
//! decoder reports reading support. Call [`init`] once before collecting;
//! later calls return the same registry.

use image::ImageFormat;
use std::path::Path;
use std::sync::OnceLock;

/// Extension written by the normalizer for converted container images.
pub const NORMALIZED_EXTENSION: &str = "jpg";

const NATIVE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
];

const CONTAINER_EXTENSIONS: &[&str] = &["heic", "heif", "avif"];

static REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();

/// How a supported file is fed into the collage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Directly decodable raster.
    Native,
    /// HEIF-family container that must be normalized first.
    Container,
}

#[derive(Debug)]
pub struct FormatRegistry {
    entries: Vec<(&'static str, FormatKind)>,
}

impl FormatRegistry {
    fn build() -> Self {
        let mut entries: Vec<(&'static str, FormatKind)> = NATIVE_CANDIDATES
            .iter()
            .filter(|(_, fmt)| fmt.reading_enabled())
            .map(|(ext, _)| (*ext, FormatKind::Native))
            .collect();
        entries.extend(
            CONTAINER_EXTENSIONS
                .iter()
                .map(|ext| (*ext, FormatKind::Container)),
        );
        Self { entries }
    }

    /// Classify a path by its extension, case-insensitively.
    pub fn classify(&self, path: &Path) -> Option<FormatKind> {
        let ext = path.extension()?.to_str()?;
        self.entries
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(ext))
            .map(|(_, kind)| *kind)
    }

    /// All registered extensions, natives first.
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(ext, _)| *ext)
    }
}

/// Build the registry on first use and return it.
pub fn init() -> &'static FormatRegistry {
    REGISTRY.get_or_init(|| {
        let registry = FormatRegistry::build();
        tracing::debug!(
            extensions = ?registry.extensions().collect::<Vec<_>>(),
            "registered image formats"
        );
        registry
    })
}
