//! CLI output formatting for washing and comparison.
//!
//! # Output Format
//!
//! ## Wash
//!
//! ```text
//! Washing 10 images from 3 sources
//! 001 보일러청소_k3x9.jpg (1000x667, 182.4 KB)
//!     Source: boiler.png
//! 004 단열_0pq2.jpg FAILED
//!     Source: broken.jpg
//!     Error: failed to decode image: ...
//!
//! 9 washed, 1 failed (10 total)
//! Manifest: out/manifest.json
//! ```
//!
//! Units are printed as they finish, so indices may arrive out of order.
//!
//! ## Compare
//!
//! ```text
//!          A           B
//! Size     52.3 KB     48.1 KB
//! Pixels   1200x800    1000x662
//! Metadata Present     Clean
//! Result   different
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compare::{ComparisonReport, format_size_kb};
use crate::wash::{UnitOutcome, WashEvent, WashResult};
use std::path::Path;

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

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Wash output
// ============================================================================

/// Format a single wash progress event as display lines.
pub fn format_wash_event(event: &WashEvent) -> Vec<String> {
    match event {
        WashEvent::Started { sources, units } => vec![format!(
            "Washing {} from {}",
            plural(*units, "image"),
            plural(*sources, "source")
        )],
        WashEvent::UnitFinished {
            index,
            source,
            output,
            outcome,
            ..
        } => {
            let header = format!("{} {}", format_index(index + 1), output);
            match outcome {
                UnitOutcome::Written {
                    width,
                    height,
                    bytes,
                } => vec![
                    format!("{} ({}x{}, {})", header, width, height, format_size_kb(*bytes)),
                    format!("{}Source: {}", indent(1), source),
                ],
                UnitOutcome::Failed(reason) => vec![
                    format!("{} FAILED", header),
                    format!("{}Source: {}", indent(1), source),
                    format!("{}Error: {}", indent(1), reason),
                ],
            }
        }
    }
}

/// Format the closing summary of a batch.
pub fn format_wash_summary(result: &WashResult, manifest_path: &Path) -> Vec<String> {
    vec![
        String::new(),
        result.stats.to_string(),
        format!("Manifest: {}", manifest_path.display()),
    ]
}

/// Print a wash event to stdout.
pub fn print_wash_event(event: &WashEvent) {
    for line in format_wash_event(event) {
        println!("{}", line);
    }
}

/// Print the batch summary to stdout.
pub fn print_wash_summary(result: &WashResult, manifest_path: &Path) {
    for line in format_wash_summary(result, manifest_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Compare output
// ============================================================================

/// Format a comparison as a two-column table.
///
/// `diff_out` is shown when the rendered difference was saved to disk.
pub fn format_comparison(report: &ComparisonReport, diff_out: Option<&Path>) -> Vec<String> {
    let rows = [
        ("Size", &report.size_a, &report.size_b),
        ("Pixels", &report.dim_a, &report.dim_b),
        ("Metadata", &report.meta_a, &report.meta_b),
    ];
    let width = rows
        .iter()
        .map(|(_, a, _)| a.chars().count())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut lines = vec![format!("{:<8} {:<width$} {}", "", "A", "B")];
    for (label, a, b) in rows {
        lines.push(format!("{:<8} {:<width$} {}", label, a, b));
    }
    let verdict = if report.identical {
        "identical"
    } else {
        "different"
    };
    lines.push(format!("{:<8} {}", "Result", verdict));
    if let Some(path) = diff_out {
        lines.push(format!("{}Difference: {}", indent(1), path.display()));
    }
    lines
}

/// Print a comparison table to stdout.
pub fn print_comparison(report: &ComparisonReport, diff_out: Option<&Path>) {
    for line in format_comparison(report, diff_out) {
        println!("{}", line);
    }
}
