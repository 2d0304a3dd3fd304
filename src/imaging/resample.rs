//! Area-averaging (box) resampling.
//!
//! The `image` crate has no box filter, so images go through
//! `fast_image_resize` with `FilterType::Box`. The source is read in place
//! through the crate's `image` integration, so peak memory is the source plus
//! the destination. 8-bit, 16-bit, and float RGB layouts are all supported;
//! anything else, or a resizer error, falls back to `image`'s bilinear
//! `resize_exact`.

use fast_image_resize as fr;
use image::DynamicImage;
use image::imageops::FilterType;

/// Resize to exactly `width × height` with a box filter.
///
/// Returns the input untouched when it already has the requested size or
/// when either target edge is zero.
pub fn resize_box(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if width == 0 || height == 0 || (img.width(), img.height()) == (width, height) {
        return img;
    }
    match box_convolution(&img, width, height) {
        Some(resized) => resized,
        None => img.resize_exact(width, height, FilterType::Triangle),
    }
}

fn box_convolution(img: &DynamicImage, width: u32, height: u32) -> Option<DynamicImage> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    let mut dst = DynamicImage::new(width, height, img.color());
    let options =
        fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Box));
    fr::Resizer::new().resize(img, &mut dst, Some(&options)).ok()?;
    Some(dst)
}
