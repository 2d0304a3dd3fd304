//! Batch washing: many derivatives from a directory of source images.
//!
//! ## Flow
//!
//! ```text
//! source_dir/                       output_dir/
//! ├── boiler.png      ──┐           ├── 보일러청소_k3x9.jpg
//! ├── window.jpg        ├─ N units ─├── 단열_0pq2.jpg
//! └── notes.txt (skip) ─┘           ├── ...
//!                                   └── manifest.json
//! ```
//!
//! 1. **Scan**: regular files directly in `source_dir` with a supported
//!    extension, sorted by name.
//! 2. **Plan**: for each of `count` units pick a random source, the keyword
//!    `keywords[i % len]`, and a unique `{keyword}_{suffix}.jpg` name. Planning
//!    is sequential so names never collide.
//! 3. **Run**: units run in parallel on the rayon pool, each with its own
//!    random source. A unit that fails to read, decode, or encode, or that
//!    panics, is recorded and the batch carries on.
//! 4. **Manifest**: successful units, in unit order, go to `manifest.json`.
//!
//! The batch fails only when no unit succeeds.

use crate::config::{BatchConfig, ConfigError, WashConfig};
use crate::imaging::{RandomSource, ThreadRandom, TransformParams, wash_bytes};
use crate::naming::{SUFFIX_LEN, alt_text, keyword_for, output_filename, random_suffix};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions accepted as sources (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Manifest file written next to the derivatives.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Suffix redraws before the suffix grows by one character.
const SUFFIX_ATTEMPTS: usize = 64;

#[derive(Error, Debug)]
pub enum WashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("No source images found in {0}")]
    NoSources(PathBuf),
    #[error("No images were processed ({failed} failed)")]
    NothingProcessed { failed: usize },
}

// ============================================================================
// Scan
// ============================================================================

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Supported image files directly inside `dir`, sorted by file name.
pub fn find_sources(dir: &Path) -> Result<Vec<PathBuf>, WashError> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

// ============================================================================
// Plan
// ============================================================================

/// One derivative to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPlan {
    /// Zero-based unit index; also selects the keyword.
    pub index: usize,
    pub source: PathBuf,
    pub keyword: String,
    /// Output file name, unique within the batch.
    pub output: String,
    pub alt_text: String,
}

/// Plan `batch.count` units over `sources`.
///
/// Draws from `rng` in unit order: one source pick, then four suffix
/// characters per attempt. Returns an empty plan when `sources` is empty.
pub fn plan_units(
    sources: &[PathBuf],
    batch: &BatchConfig,
    rng: &mut impl RandomSource,
) -> Vec<UnitPlan> {
    if sources.is_empty() {
        return Vec::new();
    }
    let last = (sources.len() - 1) as u32;
    let mut taken: HashSet<String> = HashSet::new();

    (0..batch.count)
        .map(|index| {
            let source = sources[rng.uniform_int(0, last) as usize].clone();
            let keyword = keyword_for(&batch.keywords, index).to_string();
            let output = unique_name(&keyword, &mut taken, rng);
            UnitPlan {
                index,
                source,
                alt_text: alt_text(&batch.alt_template, &keyword),
                keyword,
                output,
            }
        })
        .collect()
}

fn unique_name(keyword: &str, taken: &mut HashSet<String>, rng: &mut impl RandomSource) -> String {
    let mut len = SUFFIX_LEN;
    loop {
        for _ in 0..SUFFIX_ATTEMPTS {
            let name = output_filename(keyword, &random_suffix(rng, len));
            if taken.insert(name.clone()) {
                return name;
            }
        }
        len += 1;
    }
}

// ============================================================================
// Run
// ============================================================================

/// What happened to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The derivative was written.
    Written { width: u32, height: u32, bytes: u64 },
    /// The unit failed; the reason is shown to the user.
    Failed(String),
}

impl UnitOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, UnitOutcome::Written { .. })
    }
}

/// Progress events streamed while a batch runs.
#[derive(Debug, Clone)]
pub enum WashEvent {
    /// Planning finished; `units` derivatives will be attempted.
    Started { sources: usize, units: usize },
    /// A unit finished. Arrives in completion order, not unit order.
    UnitFinished {
        index: usize,
        total: usize,
        source: String,
        output: String,
        outcome: UnitOutcome,
    },
}

/// Manifest row for one written derivative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Source file name.
    pub source: String,
    /// Output file name inside the output directory.
    pub output: String,
    pub keyword: String,
    pub alt_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WashStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl WashStats {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl fmt::Display for WashStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed > 0 {
            write!(
                f,
                "{} washed, {} failed ({} total)",
                self.succeeded,
                self.failed,
                self.total()
            )
        } else {
            write!(f, "{} washed", self.succeeded)
        }
    }
}

#[derive(Debug)]
pub struct WashResult {
    pub manifest: Manifest,
    pub stats: WashStats,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Message carried by a caught panic.
fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("unexpected failure: {message}")
}

/// Read, wash, and write one unit.
fn run_unit(
    plan: &UnitPlan,
    output_dir: &Path,
    params: &TransformParams,
    rng: &mut impl RandomSource,
) -> UnitOutcome {
    let source = match std::fs::read(&plan.source) {
        Ok(bytes) => bytes,
        Err(e) => return UnitOutcome::Failed(format!("read failed: {e}")),
    };
    let washed = match wash_bytes(&source, params, rng) {
        Ok(washed) => washed,
        Err(e) => return UnitOutcome::Failed(e.to_string()),
    };
    drop(source);
    let (width, height) = washed.report.output_dimensions;
    match std::fs::write(output_dir.join(&plan.output), &washed.bytes) {
        Ok(()) => UnitOutcome::Written {
            width,
            height,
            bytes: washed.bytes.len() as u64,
        },
        Err(e) => UnitOutcome::Failed(format!("write failed: {e}")),
    }
}

/// Wash a directory of sources with thread-local randomness.
pub fn wash(
    source_dir: &Path,
    output_dir: &Path,
    config: &WashConfig,
    progress: Option<Sender<WashEvent>>,
) -> Result<WashResult, WashError> {
    wash_with_random(
        source_dir,
        output_dir,
        config,
        &mut ThreadRandom::new(),
        |_| ThreadRandom::new(),
        progress,
    )
}

/// Wash a directory with explicit random sources.
///
/// `planner` drives source picks and filename suffixes; `unit_rng` builds
/// the random source for each unit from its index.
pub fn wash_with_random<P, R, F>(
    source_dir: &Path,
    output_dir: &Path,
    config: &WashConfig,
    planner: &mut P,
    unit_rng: F,
    progress: Option<Sender<WashEvent>>,
) -> Result<WashResult, WashError>
where
    P: RandomSource,
    R: RandomSource,
    F: Fn(usize) -> R + Sync,
{
    config.validate()?;
    let sources = find_sources(source_dir)?;
    if sources.is_empty() {
        return Err(WashError::NoSources(source_dir.to_path_buf()));
    }

    let mut batch = config.batch.clone();
    batch.normalize();
    let plans = plan_units(&sources, &batch, planner);
    let total = plans.len();
    if let Some(tx) = &progress {
        tx.send(WashEvent::Started {
            sources: sources.len(),
            units: total,
        })
        .ok();
    }

    std::fs::create_dir_all(output_dir)?;
    let params = config.transform.params();

    let outcomes: Vec<UnitOutcome> = plans
        .par_iter()
        .map(|plan| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut rng = unit_rng(plan.index);
                run_unit(plan, output_dir, &params, &mut rng)
            }))
            .unwrap_or_else(|payload| UnitOutcome::Failed(panic_reason(payload.as_ref())));
            if let Some(tx) = &progress {
                tx.send(WashEvent::UnitFinished {
                    index: plan.index,
                    total,
                    source: display_name(&plan.source),
                    output: plan.output.clone(),
                    outcome: outcome.clone(),
                })
                .ok();
            }
            outcome
        })
        .collect();

    let mut stats = WashStats::default();
    let mut entries = Vec::new();
    for (plan, outcome) in plans.iter().zip(&outcomes) {
        if outcome.is_written() {
            stats.succeeded += 1;
            entries.push(ManifestEntry {
                source: display_name(&plan.source),
                output: plan.output.clone(),
                keyword: plan.keyword.clone(),
                alt_text: plan.alt_text.clone(),
            });
        } else {
            stats.failed += 1;
        }
    }

    if stats.succeeded == 0 {
        return Err(WashError::NothingProcessed {
            failed: stats.failed,
        });
    }

    let manifest = Manifest { entries };
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(output_dir.join(MANIFEST_FILENAME), json)?;

    Ok(WashResult { manifest, stats })
}
