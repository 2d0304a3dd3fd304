//! Visual difference between two decoded images.
//!
//! `B` is always conformed to `A`: stretched to `A`'s exact dimensions
//! (no aspect preservation), then converted to `A`'s color mode. Comparison
//! happens at 8 bits per channel; 16-bit and float images are reduced first.
//!
//! The rendered result is inverted so unchanged pixels come out white and
//! changed pixels dark. Identical inputs render as a plain white canvas.

use super::codec::probe_metadata;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use std::borrow::Cow;

/// Smallest rectangle holding every differing pixel.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Result of comparing `A` against `B`.
#[derive(Debug, Clone)]
pub struct DiffResult {
    /// True when no pixel differs after conforming `B` to `A`.
    pub is_identical: bool,
    /// Inverted difference, or a white canvas when identical. Always `A`'s size.
    pub rendered: DynamicImage,
    pub bounding_box: Option<BoundingBox>,
}

/// Facts about one comparison input, independent of the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFacts {
    /// Length of the encoded stream, not the decoded raster.
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
    pub has_embedded_metadata: bool,
}

impl ImageFacts {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Describe one comparison input from its decoded raster and encoded bytes.
pub fn inspect(img: &DynamicImage, encoded: &[u8]) -> ImageFacts {
    ImageFacts {
        byte_size: encoded.len() as u64,
        width: img.width(),
        height: img.height(),
        has_embedded_metadata: probe_metadata(encoded).any(),
    }
}

/// 8-bit color mode used to compare against an image of `color`.
fn working_color(color: ColorType) -> ColorType {
    match color {
        ColorType::L8 | ColorType::L16 => ColorType::L8,
        ColorType::La8 | ColorType::La16 => ColorType::La8,
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => ColorType::Rgb8,
        _ => ColorType::Rgba8,
    }
}

fn convert_to(img: &DynamicImage, color: ColorType) -> DynamicImage {
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(img.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => DynamicImage::ImageRgba8(img.to_rgba8()),
    }
}

fn from_raw(color: ColorType, width: u32, height: u32, raw: Vec<u8>) -> Option<DynamicImage> {
    match color {
        ColorType::L8 => GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
        ColorType::La8 => {
            GrayAlphaImage::from_raw(width, height, raw).map(DynamicImage::ImageLumaA8)
        }
        ColorType::Rgb8 => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
        _ => RgbaImage::from_raw(width, height, raw).map(DynamicImage::ImageRgba8),
    }
}

/// Stretch `b` to `a`'s dimensions and convert it to `color`.
fn conform<'b>(b: &'b DynamicImage, dims: (u32, u32), color: ColorType) -> Cow<'b, DynamicImage> {
    let resized = if (b.width(), b.height()) == dims {
        Cow::Borrowed(b)
    } else {
        Cow::Owned(b.resize_exact(dims.0, dims.1, FilterType::CatmullRom))
    };
    if resized.color() == color {
        resized
    } else {
        Cow::Owned(convert_to(&resized, color))
    }
}

/// Per-sample absolute difference of two equally shaped 8-bit buffers.
fn abs_difference(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(x, y)| x.abs_diff(*y)).collect()
}

/// Tight box around every pixel with any non-zero channel.
pub fn difference_bbox(diff: &[u8], width: u32, channels: usize) -> Option<BoundingBox> {
    if width == 0 || channels == 0 {
        return None;
    }
    let mut found: Option<BoundingBox> = None;
    for (i, px) in diff.chunks_exact(channels).enumerate() {
        if px.iter().all(|&v| v == 0) {
            continue;
        }
        let x = (i as u64 % width as u64) as u32;
        let y = (i as u64 / width as u64) as u32;
        found = Some(match found {
            None => BoundingBox {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => BoundingBox {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        });
    }
    found
}

/// Compare `a` (reference) against `b`. Never fails for decoded inputs.
pub fn compare(a: &DynamicImage, b: &DynamicImage) -> DiffResult {
    let dims = (a.width(), a.height());
    let color = working_color(a.color());

    let a_work: Cow<'_, DynamicImage> = if a.color() == color {
        Cow::Borrowed(a)
    } else {
        Cow::Owned(convert_to(a, color))
    };
    let b_work = conform(b, dims, color);

    let diff = abs_difference(a_work.as_bytes(), b_work.as_bytes());
    drop(b_work);
    let bounding_box = difference_bbox(&diff, dims.0, color.channel_count() as usize);

    let rendered = match bounding_box {
        None => DynamicImage::ImageRgb8(RgbImage::from_pixel(
            dims.0,
            dims.1,
            image::Rgb([255, 255, 255]),
        )),
        Some(_) => {
            let inverted: Vec<u8> = diff.into_iter().map(|v| 255 - v).collect();
            from_raw(color, dims.0, dims.1, inverted).unwrap_or_else(|| {
                DynamicImage::ImageRgb8(RgbImage::new(dims.0, dims.1))
            })
        }
    };

    DiffResult {
        is_identical: bounding_box.is_none(),
        rendered,
        bounding_box,
    }
}
