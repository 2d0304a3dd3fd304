//! Image processing in pure Rust, all in memory.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (PNG, JPEG, WebP) |
//! | **Box resample** | `fast_image_resize` (`FilterType::Box`) |
//! | **Crop / color / perturb** | `image` buffers, per-pixel arithmetic |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//! | **Metadata probe** | `kamadak-exif` + `ImageDecoder::icc_profile` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and crop math (unit testable)
//! - **Parameters**: Data structures describing one pipeline run
//! - **Random**: [`RandomSource`] capability injected into anything that draws
//! - **Transform**: The washing pipeline, stage by stage
//! - **Diff**: Visual difference between two images plus per-input facts

pub mod calculations;
pub mod codec;
pub mod diff;
mod params;
pub mod random;
mod resample;
pub mod transform;

pub use calculations::CropRegion;
pub use codec::{ImagingError, MetadataBlocks, decode, encode_jpeg, probe_metadata};
pub use diff::{DiffResult, ImageFacts, compare, inspect};
pub use params::{EnhanceRange, Quality, TransformParams};
pub use random::{RandomSource, ThreadRandom};
pub use resample::resize_box;
pub use transform::{Stage, TransformReport, Transformed, Washed, transform, wash_bytes};
