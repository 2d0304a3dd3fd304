//! Decode, encode, and metadata probing for in-memory byte streams.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP) | `image::ImageReader` with content sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | EXIF presence | `kamadak-exif` container reader |
//! | ICC presence | `image::ImageDecoder::icc_profile` |
//!
//! Nothing is copied from the source stream into the encoded output. The
//! encoder only ever sees pixels, so EXIF/ICC/XMP blocks are left behind.

use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Decode an encoded byte stream, sniffing the format from its content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(ImagingError::Decode("unrecognized image format".into()));
    }
    reader
        .decode()
        .map_err(|e| ImagingError::Decode(e.to_string()))
}

/// Encode as baseline JPEG. Non-RGB images are flattened to 8-bit RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.as_u8());
    let result = match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => img.write_with_encoder(encoder),
        other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder),
    };
    result.map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Which embedded metadata blocks a byte stream carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataBlocks {
    /// A non-empty EXIF block.
    pub exif: bool,
    /// A non-empty ICC color profile.
    pub icc: bool,
}

impl MetadataBlocks {
    pub fn any(&self) -> bool {
        self.exif || self.icc
    }
}

/// Probe a byte stream for embedded metadata without decoding pixels.
///
/// Unreadable or absent blocks count as "not present"; this never fails.
pub fn probe_metadata(bytes: &[u8]) -> MetadataBlocks {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .map(|found| found.fields().next().is_some())
        .unwrap_or(false);

    let icc = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_decoder().ok())
        .and_then(|mut decoder| decoder.icc_profile().ok().flatten())
        .is_some_and(|profile| !profile.is_empty());

    MetadataBlocks { exif, icc }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgb, jpeg_bytes, jpeg_with_exif, png_bytes, solid_rgba};
    use image::GenericImageView;

    #[test]
    fn decode_png() {
        let bytes = png_bytes(&gradient_rgb(40, 30));
        let img = decode(&bytes).unwrap();
        assert_eq!(img.dimensions(), (40, 30));
    }

    #[test]
    fn decode_jpeg() {
        let bytes = jpeg_bytes(&gradient_rgb(64, 48));
        let img = decode(&bytes).unwrap();
        assert_eq!(img.dimensions(), (64, 48));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }

    #[test]
    fn decode_truncated_png_is_decode_error() {
        let bytes = png_bytes(&gradient_rgb(40, 30));
        let err = decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }

    #[test]
    fn decode_empty_is_decode_error() {
        assert!(matches!(decode(&[]), Err(ImagingError::Decode(_))));
    }

    #[test]
    fn encode_jpeg_produces_soi_marker() {
        let bytes = encode_jpeg(&gradient_rgb(20, 20), Quality::default()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(decode(&bytes).unwrap().dimensions(), (20, 20));
    }

    #[test]
    fn encode_jpeg_flattens_alpha() {
        let bytes = encode_jpeg(&solid_rgba(16, 8, [10, 20, 30, 0]), Quality::new(80)).unwrap();
        let img = decode(&bytes).unwrap();
        assert_eq!(img.dimensions(), (16, 8));
        assert!(!img.color().has_alpha());
    }

    #[test]
    fn higher_quality_is_not_smaller() {
        let img = gradient_rgb(128, 128);
        let low = encode_jpeg(&img, Quality::new(10)).unwrap();
        let high = encode_jpeg(&img, Quality::new(95)).unwrap();
        assert!(high.len() >= low.len());
    }

    #[test]
    fn probe_finds_exif_block() {
        let bytes = jpeg_with_exif(&gradient_rgb(32, 32));
        let blocks = probe_metadata(&bytes);
        assert!(blocks.exif);
        assert!(blocks.any());
    }

    #[test]
    fn probe_plain_streams_are_clean() {
        assert_eq!(
            probe_metadata(&png_bytes(&gradient_rgb(8, 8))),
            MetadataBlocks::default()
        );
        assert!(!probe_metadata(&jpeg_bytes(&gradient_rgb(8, 8))).any());
    }

    #[test]
    fn probe_garbage_is_clean() {
        assert!(!probe_metadata(b"xyz").any());
    }

    #[test]
    fn reencode_drops_exif() {
        let source = jpeg_with_exif(&gradient_rgb(32, 32));
        let img = decode(&source).unwrap();
        let reencoded = encode_jpeg(&img, Quality::default()).unwrap();
        assert!(!probe_metadata(&reencoded).any());
    }
}
