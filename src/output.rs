//! CLI output formatting for builds and checks.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every page leads with
//! its positional index and title, followed by `→` and the file it became.
//! The source file is shown as secondary context on an indented `Source:`
//! line, so the listing reads as a content inventory while still letting
//! users trace each entry back to a file.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Pages
//! 001 Home → index.html
//!     Source: content/index.md
//! 002 Blog → blog.html
//!     Source: content/blog.md
//! 003 Blog → blog2.html
//!     Continues: content/blog.md
//!
//! Orphans
//!     content/blog/rust/intro.md
//!
//! Wrote 3 pages (1 continuation), copied 2 media files
//! ```
//!
//! ## Check
//!
//! ```text
//! 4 pages, 2 roots, 1 category, 3 tags
//!
//! Orphans
//!     content/blog/rust/intro.md
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::engine::{BuildReport, CheckReport};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` when it lives under it.
fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// `1 page`, `2 pages`.
fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

fn orphan_lines(orphans: &[PathBuf], root: &Path) -> Vec<String> {
    if orphans.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Orphans".to_string()];
    for path in orphans {
        lines.push(format!("{}{}", indent(1), relative(path, root).display()));
    }
    lines
}

// ============================================================================
// Build
// ============================================================================

/// Format the build report.
///
/// `source_root` and `output_root` are stripped from displayed paths.
pub fn format_build_report(report: &BuildReport, source_root: &Path, output_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.pages.is_empty() {
        lines.push("Pages".to_string());
    }
    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            page.title,
            relative(&page.output, output_root).display()
        ));
        let label = if page.spawned { "Continues" } else { "Source" };
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            label,
            relative(&page.source, source_root).display()
        ));
    }

    lines.extend(orphan_lines(&report.orphans, source_root));

    let continuations = report.pages.iter().filter(|p| p.spawned).count();
    let mut summary = format!("Wrote {}", plural(report.pages.len(), "page", "pages"));
    if continuations > 0 {
        summary.push_str(&format!(
            " ({})",
            plural(continuations, "continuation", "continuations")
        ));
    }
    summary.push_str(&format!(
        ", copied {}",
        plural(report.media_files, "media file", "media files")
    ));
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(summary);
    lines
}

/// Print the build report to stdout.
pub fn print_build_report(report: &BuildReport, source_root: &Path, output_root: &Path) {
    for line in format_build_report(report, source_root, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_report(report: &CheckReport, source_root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "{}, {}, {}, {}",
        plural(report.pages, "page", "pages"),
        plural(report.roots, "root", "roots"),
        plural(report.categories, "category", "categories"),
        plural(report.tags, "tag", "tags"),
    )];
    lines.extend(orphan_lines(&report.orphans, source_root));
    lines
}

/// Print the check report to stdout.
pub fn print_check_report(report: &CheckReport, source_root: &Path) {
    for line in format_check_report(report, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
