//! CLI output formatting.
//!
//! Every entity is shown as a numbered header line, with details indented
//! beneath it. Paths are printed relative to the scanned folder.
//!
//! # Output Format
//!
//! ## Collect
//!
//! ```text
//! Images
//! 001 beach.jpg
//! 002 trip/IMG_0042.jpg
//!     Converted from: trip/IMG_0042.HEIC
//!
//! Skipped
//! 001 broken.heic
//!     Reason: Processing failed: ...
//! ```
//!
//! ## Layout
//!
//! ```text
//! Layout 2x2 (2 of 4 cells)
//!     Canvas: 630x630
//!     Cell: 300x300
//! ```
//!
//! ## Compose
//!
//! ```text
//! 001 beach.jpg → column 1, row 1
//! 002 trip/IMG_0042.jpg → column 2, row 1
//! Collage written to output_collage.png (630x630)
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::collage::{Survey, display_path};
use crate::compose::Composition;
use crate::layout::LayoutPlan;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Collected images in cell order, conversions and skipped files.
pub fn format_collect_output(survey: &Survey, root: &Path) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];

    for (i, path) in survey.ordered.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            display_path(path, root).display()
        ));
        if let Some(conversion) = survey
            .collection
            .conversions
            .iter()
            .find(|c| &c.output == path)
        {
            lines.push(format!(
                "{}Converted from: {}",
                indent(1),
                display_path(&conversion.source, root).display()
            ));
        }
        if i >= survey.plan.cells_used {
            lines.push(format!("{}Not placed: grid is full", indent(1)));
        }
    }

    if !survey.collection.failures.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for (i, failure) in survey.collection.failures.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                display_path(&failure.path, root).display()
            ));
            lines.push(format!("{}Reason: {}", indent(1), failure.source));
        }
    }

    lines
}

/// Grid shape and pixel geometry.
pub fn format_layout_output(plan: &LayoutPlan) -> Vec<String> {
    vec![
        format!(
            "Layout {}x{} ({} of {} cells)",
            plan.grid.columns,
            plan.grid.rows,
            plan.cells_used,
            plan.grid.capacity()
        ),
        format!(
            "{}Canvas: {}x{}",
            indent(1),
            plan.canvas.width,
            plan.canvas.height
        ),
        format!("{}Cell: {}x{}", indent(1), plan.cell.width, plan.cell.height),
    ]
}

/// Where each image was placed, then the written file.
pub fn format_compose_output(composition: &Composition, root: &Path) -> Vec<String> {
    let mut lines: Vec<String> = composition
        .placements
        .iter()
        .enumerate()
        .map(|(i, placement)| {
            format!(
                "{} {} \u{2192} column {}, row {}",
                format_index(i + 1),
                display_path(&placement.path, root).display(),
                placement.column + 1,
                placement.row + 1
            )
        })
        .collect();
    lines.push(format!(
        "Collage written to {} ({}x{})",
        composition.output.display(),
        composition.width,
        composition.height
    ));
    lines
}

pub fn print_collect_output(survey: &Survey, root: &Path) {
    for line in format_collect_output(survey, root) {
        println!("{}", line);
    }
}

pub fn print_layout_output(plan: &LayoutPlan) {
    for line in format_layout_output(plan) {
        println!("{}", line);
    }
}

pub fn print_compose_output(composition: &Composition, root: &Path) {
    for line in format_compose_output(composition, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
