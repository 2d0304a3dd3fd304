//! Pure calculation functions for image dimensions and crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `(width, height)` inside a `max_edge × max_edge` box, preserving aspect.
///
/// Returns `None` when the image already fits, so the caller can skip the
/// downsample entirely. The longer edge lands exactly on `max_edge`; the
/// shorter edge is rounded and never drops below 1.
///
/// # Examples
/// ```
/// # use imgwash::imaging::calculations::fit_within;
/// assert_eq!(fit_within((2000, 1000), 1500), Some((1500, 750)));
/// assert_eq!(fit_within((800, 600), 1500), None);
/// ```
pub fn fit_within(dims: (u32, u32), max_edge: u32) -> Option<(u32, u32)> {
    let (w, h) = dims;
    if w <= max_edge && h <= max_edge {
        return None;
    }

    if w >= h {
        let nh = (h as f64 * max_edge as f64 / w as f64).round() as u32;
        Some((max_edge, nh.clamp(1, max_edge)))
    } else {
        let nw = (w as f64 * max_edge as f64 / h as f64).round() as u32;
        Some((nw.clamp(1, max_edge), max_edge))
    }
}

/// Height that preserves aspect ratio when scaling to `target_width`.
///
/// Returns `None` for a zero-width source (nothing to scale against).
///
/// # Examples
/// ```
/// # use imgwash::imaging::calculations::proportional_height;
/// assert_eq!(proportional_height((1480, 740), 1000), Some(500));
/// assert_eq!(proportional_height((0, 740), 1000), None);
/// ```
pub fn proportional_height(dims: (u32, u32), target_width: u32) -> Option<u32> {
    let (w, h) = dims;
    if w == 0 {
        return None;
    }
    let nh = (h as f64 * target_width as f64 / w as f64).round() as u32;
    Some(nh.max(1))
}

/// Largest per-edge trim allowed for an image of this size.
///
/// Small images (either edge at or below `min_dimension`) are never cropped.
pub fn crop_margin_bound(dims: (u32, u32), margin: u32, min_dimension: u32) -> u32 {
    let (w, h) = dims;
    if w > min_dimension && h > min_dimension {
        margin
    } else {
        0
    }
}

/// Rectangular region in source pixel coordinates.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRegion {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// True when the region spans the whole image.
    pub fn is_full(&self, dims: (u32, u32)) -> bool {
        self.left == 0 && self.top == 0 && self.right == dims.0 && self.bottom == dims.1
    }
}

/// Per-edge trims drawn for one crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CropInsets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Turn drawn insets into a region, or `None` if the result would be empty.
///
/// Guarantees `0 <= left < right <= width` and `0 <= top < bottom <= height`
/// for every returned region.
pub fn crop_region(dims: (u32, u32), insets: CropInsets) -> Option<CropRegion> {
    let (w, h) = dims;
    let right = w.checked_sub(insets.right)?;
    let bottom = h.checked_sub(insets.bottom)?;

    if right > insets.left && bottom > insets.top {
        Some(CropRegion {
            left: insets.left,
            top: insets.top,
            right,
            bottom,
        })
    } else {
        None
    }
}
