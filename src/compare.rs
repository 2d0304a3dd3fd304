//! Comparison requests: two encoded images in, a displayable report out.
//!
//! Both inputs are decoded (either failing fails the request), described with
//! [`inspect`](crate::imaging::inspect), and diffed with `A` as reference.
//! The rendered difference is JPEG-encoded and embedded as a base64 data URI
//! so a report can be shown without touching disk.
//!
//! ```text
//! {
//!   "meta_a": "Present",   "meta_b": "Clean",
//!   "size_a": "52.3 KB",   "size_b": "48.1 KB",
//!   "dim_a":  "1200x800",  "dim_b":  "1000x662",
//!   "identical": false,
//!   "diff_image": "data:image/jpeg;base64,/9j/4AAQ..."
//! }
//! ```

use crate::imaging::{
    DiffResult, ImageFacts, ImagingError, Quality, compare, decode, encode_jpeg, inspect,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image {label}: {source}")]
    Decode {
        label: &'static str,
        source: ImagingError,
    },
    #[error("Failed to encode difference image: {0}")]
    Encode(ImagingError),
}

/// Full result of a comparison, before formatting.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub facts_a: ImageFacts,
    pub facts_b: ImageFacts,
    pub diff: DiffResult,
    /// The rendered difference, JPEG-encoded.
    pub diff_jpeg: Vec<u8>,
}

/// Display-ready comparison, as returned to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    pub meta_a: String,
    pub meta_b: String,
    pub size_a: String,
    pub size_b: String,
    pub dim_a: String,
    pub dim_b: String,
    pub identical: bool,
    pub diff_image: String,
}

impl Comparison {
    pub fn report(&self) -> ComparisonReport {
        ComparisonReport {
            meta_a: metadata_label(&self.facts_a).to_string(),
            meta_b: metadata_label(&self.facts_b).to_string(),
            size_a: format_size_kb(self.facts_a.byte_size),
            size_b: format_size_kb(self.facts_b.byte_size),
            dim_a: format_dimensions(&self.facts_a),
            dim_b: format_dimensions(&self.facts_b),
            identical: self.diff.is_identical,
            diff_image: jpeg_data_uri(&self.diff_jpeg),
        }
    }
}

/// `"Present"` when the stream carries EXIF or ICC data, else `"Clean"`.
pub fn metadata_label(facts: &ImageFacts) -> &'static str {
    if facts.has_embedded_metadata {
        "Present"
    } else {
        "Clean"
    }
}

/// Raw byte count as kibibytes with one decimal: `"52.3 KB"`.
pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// `"{width}x{height}"`
pub fn format_dimensions(facts: &ImageFacts) -> String {
    format!("{}x{}", facts.width, facts.height)
}

pub fn jpeg_data_uri(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

/// Compare two encoded images. `a` is the reference.
pub fn compare_bytes(a: &[u8], b: &[u8], quality: Quality) -> Result<Comparison, CompareError> {
    let img_a = decode(a).map_err(|source| CompareError::Decode { label: "A", source })?;
    let img_b = decode(b).map_err(|source| CompareError::Decode { label: "B", source })?;

    let facts_a = inspect(&img_a, a);
    let facts_b = inspect(&img_b, b);

    let diff = compare(&img_a, &img_b);
    drop(img_a);
    drop(img_b);
    let diff_jpeg = encode_jpeg(&diff.rendered, quality).map_err(CompareError::Encode)?;

    Ok(Comparison {
        facts_a,
        facts_b,
        diff,
        diff_jpeg,
    })
}

/// Read two files and compare them.
pub fn compare_files(a: &Path, b: &Path, quality: Quality) -> Result<Comparison, CompareError> {
    let bytes_a = std::fs::read(a)?;
    let bytes_b = std::fs::read(b)?;
    compare_bytes(&bytes_a, &bytes_b, quality)
}
