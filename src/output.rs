//! CLI output formatting for `build` and `check`.
//!
//! Output is information-first: every comic leads with its position, date
//! and title, with the source path, warnings and errors as indented context
//! lines.
//!
//! ## Build
//!
//! ```text
//! Comics
//! 001 2024-01-01 The Visit (4 panels) → 2024-01-01.html
//!     Source: comics/visit/comic.md
//!     Warning: line 7: no image reference in "door"
//! 002 2024-01-08 ghost FAILED
//!     Source: comics/ghost/comic.md
//!     Error: comic folder not found: comics/ghost
//!
//! Index → index.html (redirects to 2024-01-01.html)
//! Generated 1 page, 1 failed, 4 images copied
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`, no I/O)
//! and a `print_*` wrapper that writes to stdout.

use crate::site::{BuildReport, IndexPage, Manifest, Outcome};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `001 2024-01-01 The Visit (4 panels)`
fn comic_header(index: usize, date: &str, title: &str, panels: usize) -> String {
    let title = if title.is_empty() {
        "(untitled)".to_string()
    } else {
        truncate(title, 60)
    };
    let unit = if panels == 1 { "panel" } else { "panels" };
    format!("{} {} {} ({} {})", format_index(index), date, title, panels, unit)
}

fn failed_header(index: usize, date: &str, name: &str) -> String {
    format!("{} {} {} FAILED", format_index(index), date, name)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn context_lines(lines: &mut Vec<String>, source: &Path, warnings: &[String], error: Option<&str>) {
    lines.push(format!("    Source: {}", source.display()));
    for warning in warnings {
        lines.push(format!("    Warning: {}", warning));
    }
    if let Some(error) = error {
        lines.push(format!("    Error: {}", error));
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Build output
// ============================================================================

/// Format the result of `build`.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Comics".to_string()];

    for (i, entry) in report.entries.iter().enumerate() {
        match &entry.outcome {
            Outcome::Published {
                title,
                panels,
                page,
                warnings,
            } => {
                let header = comic_header(i + 1, &entry.date, title, *panels);
                lines.push(format!("{} \u{2192} {}", header, page));
                context_lines(&mut lines, &entry.source, warnings, None);
            }
            Outcome::Failed { error } => {
                lines.push(failed_header(i + 1, &entry.date, &entry.name));
                context_lines(&mut lines, &entry.source, &[], Some(error));
            }
        }
    }

    lines.push(String::new());
    match &report.index {
        IndexPage::Redirect(date) => lines.push(format!(
            "Index \u{2192} index.html (redirects to {}.html)",
            date
        )),
        IndexPage::Placeholder => {
            lines.push("Index \u{2192} index.html (placeholder, nothing published)".to_string())
        }
    }
    lines.push(format!(
        "Generated {}, {} failed, {} copied",
        plural(report.published_count(), "page", "pages"),
        report.failed_count(),
        plural(report.assets_copied, "image", "images"),
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the result of `check`: the scanned manifest, nothing written.
pub fn format_check_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Comics".to_string()];
    let mut warning_count = 0;
    let mut failed = 0;

    for (i, entry) in manifest.comics.iter().enumerate() {
        match &entry.comic {
            Some(comic) => {
                lines.push(comic_header(
                    i + 1,
                    &entry.date,
                    &comic.title,
                    comic.panels.len(),
                ));
                context_lines(&mut lines, &entry.source, &entry.warnings, None);
                warning_count += entry.warnings.len();
            }
            None => {
                lines.push(failed_header(i + 1, &entry.date, &entry.name));
                context_lines(&mut lines, &entry.source, &[], entry.error.as_deref());
                failed += 1;
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Checked {}: {} ok, {} failed, {}",
        plural(manifest.comics.len(), "comic", "comics"),
        manifest.comics.len() - failed,
        failed,
        plural(warning_count, "warning", "warnings"),
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(manifest: &Manifest) {
    for line in format_check_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
