//! # imgwash
//!
//! Produce many lightly altered derivatives of a few source images, and
//! compare any two images visually.
//!
//! # Architecture: Pipeline + Diff
//!
//! ```text
//! wash     source/  →  N × { guard → normalize → crop → perturb → resize → JPEG }  →  out/
//! compare  A, B     →  conform B to A → |A − B| → invert  →  report + difference image
//! ```
//!
//! Every derivative is re-encoded from decoded pixels, so EXIF, ICC, and any
//! other embedded metadata of the source never reaches the output. Each one
//! gets its own small random crop and brightness/contrast nudge, a
//! keyword-based file name, and a suggested ALT text in `manifest.json`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`wash`] | Batch orchestrator: scan sources, plan units, run them in parallel, write the manifest |
//! | [`compare`] | Comparison requests: decode two streams, diff them, build a display-ready report |
//! | [`imaging`] | Pure in-memory pixel work: the transform pipeline, the diff engine, codecs |
//! | [`naming`] | Keyword parsing, derivative file names, ALT text |
//! | [`config`] | `imgwash.toml` loading, validation, and merging over stock defaults |
//! | [`output`] | CLI output formatting for wash progress and comparison tables |
//!
//! # Design Decisions
//!
//! ## Randomness Is Injected
//!
//! Every random draw (crop insets, enhancement factors, source picks, file
//! name suffixes) goes through [`imaging::RandomSource`]. Production code uses
//! the thread-local generator; tests script the exact draws, so crop
//! geometry and pixel arithmetic are checked against known values.
//!
//! ## Degenerate Geometry Never Fails
//!
//! Tiny images skip the crop, zero-sized targets skip the resize, and every
//! stage says whether it ran. A batch only errors when no derivative at all
//! could be produced.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate, area-averaging downsamples use
//! `fast_image_resize`, and metadata probing uses `kamadak-exif`. No system
//! libraries are required.

pub mod compare;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod wash;

#[cfg(test)]
pub(crate) mod test_helpers;
