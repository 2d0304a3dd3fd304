//! Shared test utilities for the imgwash test suite.
//!
//! Synthetic rasters and encoded byte streams, so no test depends on fixture
//! files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let bytes = jpeg_with_exif(&gradient_rgb(64, 48));
//! assert!(crate::imaging::probe_metadata(&bytes).exif);
//! ```

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Rasters
// =========================================================================

pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(rgb)))
}

pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, height, Rgba(rgba)))
}

/// Horizontal/vertical ramps, so crops and resizes change content.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

// =========================================================================
// Encoded streams
// =========================================================================

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    encode(img, ImageFormat::Png)
}

pub fn jpeg_bytes(img: &DynamicImage) -> Vec<u8> {
    encode(&DynamicImage::ImageRgb8(img.to_rgb8()), ImageFormat::Jpeg)
}

/// A JPEG with an APP1 EXIF segment (IFD0 with a single Orientation tag)
/// spliced in right after SOI.
pub fn jpeg_with_exif(img: &DynamicImage) -> Vec<u8> {
    let jpeg = jpeg_bytes(img);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(b"II");
    payload.extend_from_slice(&42u16.to_le_bytes());
    payload.extend_from_slice(&8u32.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes()); // one entry
    payload.extend_from_slice(&0x0112u16.to_le_bytes()); // Orientation
    payload.extend_from_slice(&3u16.to_le_bytes()); // SHORT
    payload.extend_from_slice(&1u32.to_le_bytes()); // count
    payload.extend_from_slice(&1u32.to_le_bytes()); // value, padded
    payload.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write an encoded image into `dir/name`.
pub fn write_image(dir: &Path, name: &str, bytes: &[u8]) {
    std::fs::write(dir.join(name), bytes).unwrap();
}
