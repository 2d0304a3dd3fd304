//! The washing pipeline: one decoded image in, one perturbed image out.
//!
//! ```text
//! 1. guard_memory     fit inside max_dimension² (box filter)
//! 2. normalize_color  anything but 8-bit RGB → 8-bit RGB
//! 3. apply_crop       trim 0..=crop_margin px per edge (random)
//! 4. brightness       × factor in [0.9, 1.1] (random)
//!    contrast         around mean luma, × factor in [0.9, 1.1] (random)
//! 5. resize_to_width  target_width wide, aspect preserved (box filter)
//! ```
//!
//! Encoding (stage 6) lives in [`codec`](super::codec); [`wash_bytes`] runs
//! decode → pipeline → encode for callers holding raw bytes.
//!
//! Each stage consumes its input and returns a [`Stage`], so the previous
//! raster is freed as soon as the next one exists. Geometry edge cases never
//! fail: the stage reports [`Stage::Skipped`] and passes the image through.

use super::calculations::{
    CropInsets, CropRegion, crop_margin_bound, crop_region, fit_within, proportional_height,
};
use super::codec::{ImagingError, decode, encode_jpeg};
use super::params::{EnhanceRange, TransformParams};
use super::random::RandomSource;
use super::resample::resize_box;
use image::{DynamicImage, RgbImage};

/// Outcome of a single pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// The stage changed the image.
    Applied(DynamicImage),
    /// The stage had nothing to do, or its geometry was degenerate.
    Skipped(DynamicImage),
}

impl Stage {
    pub fn applied(&self) -> bool {
        matches!(self, Stage::Applied(_))
    }

    pub fn image(&self) -> &DynamicImage {
        match self {
            Stage::Applied(img) | Stage::Skipped(img) => img,
        }
    }

    pub fn into_image(self) -> DynamicImage {
        match self {
            Stage::Applied(img) | Stage::Skipped(img) => img,
        }
    }
}

/// What one pipeline run did, for logging and assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformReport {
    pub source_dimensions: (u32, u32),
    pub guarded: bool,
    pub normalized: bool,
    pub crop: Option<CropRegion>,
    pub brightness: f64,
    pub contrast: f64,
    pub resized: bool,
    pub output_dimensions: (u32, u32),
}

/// A pipeline result: the final raster plus its report.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub image: DynamicImage,
    pub report: TransformReport,
}

/// Stage 1: bring both edges to at most `max_dimension`.
pub fn guard_memory(img: DynamicImage, max_dimension: u32) -> Stage {
    match fit_within((img.width(), img.height()), max_dimension) {
        Some((w, h)) => Stage::Applied(resize_box(img, w, h)),
        None => Stage::Skipped(img),
    }
}

/// Stage 2: collapse alpha, palette-expanded, grayscale and high-depth modes
/// to 8-bit RGB. JPEG output cannot carry alpha.
pub fn normalize_color(img: DynamicImage) -> Stage {
    match img {
        DynamicImage::ImageRgb8(_) => Stage::Skipped(img),
        other => Stage::Applied(DynamicImage::ImageRgb8(other.into_rgb8())),
    }
}

/// Draw four independent insets and turn them into a crop region.
///
/// Returns `None` when the drawn region would be empty.
pub fn draw_crop(
    dims: (u32, u32),
    margin: u32,
    min_dimension: u32,
    rng: &mut impl RandomSource,
) -> Option<CropRegion> {
    let bound = crop_margin_bound(dims, margin, min_dimension);
    let insets = CropInsets {
        left: rng.uniform_int(0, bound),
        top: rng.uniform_int(0, bound),
        right: rng.uniform_int(0, bound),
        bottom: rng.uniform_int(0, bound),
    };
    crop_region(dims, insets)
}

/// Stage 3: apply a drawn crop. A missing or full-frame region passes through.
pub fn apply_crop(img: DynamicImage, region: Option<CropRegion>) -> Stage {
    match region {
        Some(r) if !r.is_full((img.width(), img.height())) => {
            Stage::Applied(img.crop_imm(r.left, r.top, r.width(), r.height()))
        }
        _ => Stage::Skipped(img),
    }
}

fn scale_sample(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Multiply every channel by `factor` (a blend towards black below 1.0).
pub fn adjust_brightness(mut img: RgbImage, factor: f64) -> RgbImage {
    for pixel in img.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = scale_sample(*c as f64 * factor);
        }
    }
    img
}

/// Mean ITU-R 601 luma, rounded to an integer level.
pub fn mean_luma(img: &RgbImage) -> u8 {
    let count = img.width() as u64 * img.height() as u64;
    if count == 0 {
        return 0;
    }
    let total: u64 = img
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (r as u64 * 299 + g as u64 * 587 + b as u64 * 114 + 500) / 1000
        })
        .sum();
    ((total as f64 / count as f64) + 0.5) as u8
}

/// Stretch every channel away from (or towards) the mean luma by `factor`.
pub fn adjust_contrast(mut img: RgbImage, factor: f64) -> RgbImage {
    let mean = mean_luma(&img) as f64;
    for pixel in img.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = scale_sample(mean + factor * (*c as f64 - mean));
        }
    }
    img
}

/// Stage 4: brightness first, then contrast against the brightened image.
pub fn perturb(img: DynamicImage, brightness: f64, contrast: f64) -> Stage {
    let rgb = img.into_rgb8();
    let rgb = adjust_brightness(rgb, brightness);
    Stage::Applied(DynamicImage::ImageRgb8(adjust_contrast(rgb, contrast)))
}

fn draw_factor(range: EnhanceRange, rng: &mut impl RandomSource) -> f64 {
    rng.uniform(range.min, range.max)
}

/// Stage 5: scale to `target_width`, keeping the aspect ratio.
pub fn resize_to_width(img: DynamicImage, target_width: u32) -> Stage {
    let dims = (img.width(), img.height());
    match proportional_height(dims, target_width) {
        Some(h) if (target_width, h) != dims && target_width > 0 => {
            Stage::Applied(resize_box(img, target_width, h))
        }
        _ => Stage::Skipped(img),
    }
}

/// Run stages 1–5 over a decoded image.
///
/// Consumes exactly four integer draws (crop insets) and two float draws
/// (brightness, then contrast) from `rng`.
pub fn transform(
    source: DynamicImage,
    params: &TransformParams,
    rng: &mut impl RandomSource,
) -> Transformed {
    let source_dimensions = (source.width(), source.height());

    let guarded = guard_memory(source, params.max_dimension);
    let guarded_applied = guarded.applied();

    let normalized = normalize_color(guarded.into_image());
    let normalized_applied = normalized.applied();
    let img = normalized.into_image();

    let region = draw_crop(
        (img.width(), img.height()),
        params.crop_margin,
        params.min_crop_dimension,
        rng,
    );
    let cropped = apply_crop(img, region);
    let crop = cropped.applied().then_some(region).flatten();

    let brightness = draw_factor(params.brightness, rng);
    let contrast = draw_factor(params.contrast, rng);
    let perturbed = perturb(cropped.into_image(), brightness, contrast);

    let resized = resize_to_width(perturbed.into_image(), params.target_width);
    let resized_applied = resized.applied();
    let image = resized.into_image();

    let report = TransformReport {
        source_dimensions,
        guarded: guarded_applied,
        normalized: normalized_applied,
        crop,
        brightness,
        contrast,
        resized: resized_applied,
        output_dimensions: (image.width(), image.height()),
    };

    Transformed { image, report }
}

/// A washed image ready to write out.
#[derive(Debug, Clone)]
pub struct Washed {
    pub bytes: Vec<u8>,
    pub report: TransformReport,
}

/// Decode → transform → JPEG encode.
pub fn wash_bytes(
    source: &[u8],
    params: &TransformParams,
    rng: &mut impl RandomSource,
) -> Result<Washed, ImagingError> {
    let decoded = decode(source)?;
    let Transformed { image, report } = transform(decoded, params, rng);
    let bytes = encode_jpeg(&image, params.quality)?;
    Ok(Washed { bytes, report })
}
