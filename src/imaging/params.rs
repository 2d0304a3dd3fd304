//! Parameter types for image operations.
//!
//! These structs describe *what* the transform pipeline should do, not *how*.
//! They are built from [`TransformConfig`](crate::config::TransformConfig) and
//! handed to [`transform`](super::transform::transform).
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 95). Clamped on construction.
//! - [`EnhanceRange`]: Closed range for brightness/contrast factors (default 0.9–1.1).
//! - [`TransformParams`]: Everything one pipeline run needs.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the encoder's byte argument.
    pub fn as_u8(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Closed range for multiplicative enhancement factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhanceRange {
    pub min: f64,
    pub max: f64,
}

impl EnhanceRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, factor: f64) -> bool {
        (self.min..=self.max).contains(&factor)
    }
}

impl Default for EnhanceRange {
    fn default() -> Self {
        Self { min: 0.9, max: 1.1 }
    }
}

/// Parameters for one transform pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    /// Memory guard: both edges are brought to at most this size first.
    pub max_dimension: u32,
    /// Final width; height follows the aspect ratio.
    pub target_width: u32,
    /// Largest trim per edge during the random crop.
    pub crop_margin: u32,
    /// Both edges must exceed this for the crop to trim anything.
    pub min_crop_dimension: u32,
    pub brightness: EnhanceRange,
    pub contrast: EnhanceRange,
    pub quality: Quality,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            max_dimension: 1500,
            target_width: 1000,
            crop_margin: 10,
            min_crop_dimension: 50,
            brightness: EnhanceRange::default(),
            contrast: EnhanceRange::default(),
            quality: Quality::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
        assert_eq!(Quality::default().as_u8(), 95);
    }

    #[test]
    fn enhance_range_orders_bounds() {
        let r = EnhanceRange::new(1.2, 0.8);
        assert_eq!(r.min, 0.8);
        assert_eq!(r.max, 1.2);
    }

    #[test]
    fn enhance_range_default_contains_unity() {
        let r = EnhanceRange::default();
        assert!(r.contains(1.0));
        assert!(r.contains(0.9));
        assert!(r.contains(1.1));
        assert!(!r.contains(1.2));
    }

    #[test]
    fn transform_params_defaults() {
        let p = TransformParams::default();
        assert_eq!(p.max_dimension, 1500);
        assert_eq!(p.target_width, 1000);
        assert_eq!(p.crop_margin, 10);
        assert_eq!(p.min_crop_dimension, 50);
        assert_eq!(p.quality.value(), 95);
    }
}
