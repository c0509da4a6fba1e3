//! Image discovery.
//!
//! Walks a folder tree and gathers every supported image into an
//! [`ImageSet`]. HEIF-family containers are converted to JPEG on the way in
//! (see [`crate::normalize`]); the converted path takes the container's place.
//!
//! ```text
//! photos/
//! ├── beach.jpg          → photos/beach.jpg
//! ├── IMG_0042.HEIC      → photos/IMG_0042.jpg   (converted)
//! ├── broken.heic        → skipped, reported in Collection::failures
//! ├── notes.txt          → ignored
//! └── 2023/
//!     └── dog.PNG        → photos/2023/dog.PNG
//! ```
//!
//! ## Ordering
//!
//! The set itself is unordered. [`ImageSet::into_ordered`] sorts by the raw
//! bytes of each path, which fixes which image lands in which collage cell.
//! Running twice over an unchanged folder gives the same sequence.

use crate::formats::{FormatKind, FormatRegistry};
use crate::imaging::ImageBackend;
use crate::normalize::{ConversionError, Normalizer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Unique image paths, deduplicated by path identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    paths: HashSet<PathBuf>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path. Returns `false` if it was already present.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    /// Keep only the paths for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Path) -> bool) {
        self.paths.retain(|p| keep(p));
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Canonical ordering: lexicographic on the path string.
    pub fn ordered(&self) -> Vec<PathBuf> {
        self.clone().into_ordered()
    }

    /// Consume the set into its canonical ordering.
    pub fn into_ordered(self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.paths.into_iter().collect();
        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        paths
    }
}

impl FromIterator<PathBuf> for ImageSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// A container image that was converted during collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Everything the collector found, including what it had to skip.
#[derive(Debug, Default)]
pub struct Collection {
    pub images: ImageSet,
    pub conversions: Vec<Conversion>,
    pub failures: Vec<ConversionError>,
}

/// Walk `root` and collect every supported image.
///
/// Symlinks are not followed. Unreadable entries and failed conversions are
/// logged and skipped; neither aborts the walk.
pub fn collect<B: ImageBackend>(
    root: &Path,
    registry: &FormatRegistry,
    normalizer: &Normalizer<'_, B>,
) -> Collection {
    let mut collection = Collection::default();
    let mut containers = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match registry.classify(entry.path()) {
            Some(FormatKind::Native) => {
                collection.images.insert(entry.into_path());
            }
            Some(FormatKind::Container) => containers.push(entry.into_path()),
            None => {}
        }
    }

    // Convert only after the walk so freshly written files are not rediscovered.
    for source in containers {
        match normalizer.normalize(&source) {
            Ok(output) => {
                collection.images.insert(output.clone());
                collection.conversions.push(Conversion { source, output });
            }
            Err(err) => {
                tracing::warn!(path = %source.display(), error = %err.source, "skipping image that failed to convert");
                collection.failures.push(err);
            }
        }
    }

    tracing::info!(
        root = %root.display(),
        images = collection.images.len(),
        converted = collection.conversions.len(),
        skipped = collection.failures.len(),
        "collected images"
    );
    collection
}
