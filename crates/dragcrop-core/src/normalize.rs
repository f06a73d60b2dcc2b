//! Crop-rectangle normalization.
//!
//! This is the heart of the node: take the rectangle the front-end drew,
//! reconcile it with what the image actually looks like right now, and
//! produce a rectangle that is guaranteed in-bounds. Every invalid input
//! degrades to the full image rather than an error.
//!
//! # Normalization order
//!
//! 1. Resolution change since the last run discards the drawn rectangle
//! 2. Fixed-size mode overrides the rectangle's dimensions (and centers
//!    it on first placement)
//! 3. A final bounds check falls back to the full image on any violation
//!
//! The returned reset flag tells the front-end overlay to throw away its
//! local rectangle state and resync from these values.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::preset;
use crate::CropRequest;

/// A validated, in-bounds crop window.
///
/// Invariant: `left + width <= current_width` and
/// `top + height <= current_height` for the image the rectangle was
/// normalized against, with `width` and `height` at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge of the window, in pixels from the image's left.
    pub left: u32,
    /// Top edge of the window, in pixels from the image's top.
    pub top: u32,
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
}

impl CropRect {
    /// The full-image rectangle, the safe fallback for any invalid input.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
        }
    }

    /// One past the rightmost column of the window.
    #[inline]
    pub fn right_edge(&self) -> u32 {
        self.left + self.width
    }

    /// One past the bottom row of the window.
    #[inline]
    pub fn bottom_edge(&self) -> u32 {
        self.top + self.height
    }

    /// Margin between the window and the image's right edge.
    #[inline]
    pub fn right_margin(&self, current_width: u32) -> u32 {
        current_width - self.right_edge()
    }

    /// Margin between the window and the image's bottom edge.
    #[inline]
    pub fn bottom_margin(&self, current_height: u32) -> u32 {
        current_height - self.bottom_edge()
    }
}

/// Outcome of crop normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedCrop {
    /// The validated crop window.
    pub rect: CropRect,
    /// The front-end overlay must discard its local rectangle and resync.
    pub reset_frontend: bool,
    /// Fixed-size target width after preset resolution (echoed to the UI).
    pub fixed_width: u32,
    /// Fixed-size target height after preset resolution (echoed to the UI).
    pub fixed_height: u32,
}

/// Normalize a requested crop rectangle against the current image size.
///
/// # Arguments
///
/// * `request` - The rectangle and fixed-size state as drawn by the UI
/// * `current_width` - Actual width of the incoming image
/// * `current_height` - Actual height of the incoming image
///
/// # Behavior
///
/// * If the image size differs from `request.last_width`/`last_height`,
///   the drawn rectangle is stale and is replaced by the full image
/// * In fixed-size mode the target size comes from the preset (format
///   `"<W>x<H>"`) or, for `"Custom"` and malformed names, from the
///   explicit fixed width/height; the window is centered on first
///   placement and clamped in-bounds otherwise
/// * Any remaining bound violation falls back to the full image
///
/// This function is total: every input produces a valid in-bounds
/// rectangle, never an error.
pub fn normalize_crop(
    request: &CropRequest,
    current_width: u32,
    current_height: u32,
) -> NormalizedCrop {
    let cw = i64::from(current_width);
    let ch = i64::from(current_height);

    let mut left = i64::from(request.left);
    let mut top = i64::from(request.top);
    let mut width = i64::from(request.width);
    let mut height = i64::from(request.height);

    let resolution_changed =
        current_width != request.last_width || current_height != request.last_height;
    let mut reset_frontend = false;

    if resolution_changed {
        debug!(
            "resolution changed {}x{} -> {}x{}, forcing full-image crop",
            request.last_width, request.last_height, current_width, current_height
        );
        left = 0;
        top = 0;
        width = cw;
        height = ch;
        reset_frontend = true;
    }

    let mut fixed_width = request.fixed_width;
    let mut fixed_height = request.fixed_height;

    if request.fixed_size_enabled {
        if let Some((pw, ph)) = preset::parse_preset(&request.fixed_size_preset) {
            debug!("using preset {}: {}x{}", request.fixed_size_preset, pw, ph);
            fixed_width = pw;
            fixed_height = ph;
        }
        let fw = i64::from(fixed_width);
        let fh = i64::from(fixed_height);

        // Center on first placement (or after a resolution change);
        // otherwise keep the position the user dragged to.
        let should_center = resolution_changed
            || (left == 0 && top == 0 && width == cw && height == ch);

        if should_center {
            let half_w = (fw / 2).min(cw / 2);
            let half_h = (fh / 2).min(ch / 2);
            left = (cw / 2 - half_w).max(0);
            top = (ch / 2 - half_h).max(0);
            reset_frontend = true;
        }

        // Shift back rather than spill past the image edges
        if left + fw > cw {
            left = (cw - fw).max(0);
        }
        if top + fh > ch {
            top = (ch - fh).max(0);
        }
        left = left.max(0);
        top = top.max(0);

        // Target may be larger than the image; take what fits
        width = fw.min(cw - left);
        height = fh.min(ch - top);
    }

    let right_edge = left + width;
    let bottom_edge = top + height;

    if left < 0
        || top < 0
        || right_edge > cw
        || bottom_edge > ch
        || width <= 0
        || height <= 0
    {
        warn!(
            "invalid crop area {}x{} at ({}, {}) for {}x{} image, resetting to full image",
            width, height, left, top, current_width, current_height
        );
        left = 0;
        top = 0;
        width = cw;
        height = ch;
        reset_frontend = true;
    }

    NormalizedCrop {
        rect: CropRect {
            left: left as u32,
            top: top as u32,
            width: width as u32,
            height: height as u32,
        },
        reset_frontend,
        fixed_width,
        fixed_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Request whose last size matches the image, with a drawn rectangle.
    fn request(left: i32, top: i32, width: i32, height: i32, img_w: u32, img_h: u32) -> CropRequest {
        CropRequest {
            left,
            top,
            width,
            height,
            last_width: img_w,
            last_height: img_h,
            ..CropRequest::default()
        }
    }

    #[test]
    fn test_valid_rectangle_passes_through() {
        let req = request(10, 20, 100, 50, 640, 480);
        let out = normalize_crop(&req, 640, 480);

        assert_eq!(
            out.rect,
            CropRect {
                left: 10,
                top: 20,
                width: 100,
                height: 50
            }
        );
        assert!(!out.reset_frontend);
    }

    #[test]
    fn test_margin_identities() {
        let req = request(10, 20, 100, 50, 640, 480);
        let out = normalize_crop(&req, 640, 480);

        let rect = out.rect;
        assert_eq!(rect.left + rect.width, 640 - rect.right_margin(640));
        assert_eq!(rect.top + rect.height, 480 - rect.bottom_margin(480));
    }

    #[test]
    fn test_resolution_change_forces_full_image() {
        let mut req = request(10, 20, 100, 50, 640, 480);
        req.last_width = 320;
        let out = normalize_crop(&req, 640, 480);

        assert_eq!(out.rect, CropRect::full(640, 480));
        assert!(out.reset_frontend);
    }

    #[test]
    fn test_first_run_counts_as_resolution_change() {
        // last_width/last_height default to 0 before the node ever ran
        let req = CropRequest::default();
        let out = normalize_crop(&req, 640, 480);

        assert_eq!(out.rect, CropRect::full(640, 480));
        assert!(out.reset_frontend);
    }

    #[test]
    fn test_negative_left_falls_back() {
        let req = request(-1, 0, 100, 100, 640, 480);
        let out = normalize_crop(&req, 640, 480);

        assert_eq!(out.rect, CropRect::full(640, 480));
        assert!(out.reset_frontend);
    }

    #[test]
    fn test_overflowing_width_falls_back() {
        let req = request(600, 0, 100, 100, 640, 480);
        let out = normalize_crop(&req, 640, 480);

        assert_eq!(out.rect, CropRect::full(640, 480));
        assert!(out.reset_frontend);
    }

    #[test]
    fn test_zero_size_falls_back() {
        let req = request(10, 10, 0, 100, 640, 480);
        let out = normalize_crop(&req, 640, 480);

        assert_eq!(out.rect, CropRect::full(640, 480));
        assert!(out.reset_frontend);
    }

    #[test]
    fn test_fixed_preset_centers_on_initial_placement() {
        let mut req = request(0, 0, 1024, 1024, 1024, 1024);
        req.fixed_size_enabled = true;
        req.fixed_size_preset = "512x512".to_string();
        let out = normalize_crop(&req, 1024, 1024);

        assert_eq!(
            out.rect,
            CropRect {
                left: 256,
                top: 256,
                width: 512,
                height: 512
            }
        );
        assert!(out.reset_frontend);
        assert_eq!((out.fixed_width, out.fixed_height), (512, 512));
    }

    #[test]
    fn test_fixed_size_preserves_dragged_position() {
        let mut req = request(100, 50, 512, 512, 1024, 1024);
        req.fixed_size_enabled = true;
        req.fixed_width = 512;
        req.fixed_height = 512;
        let out = normalize_crop(&req, 1024, 1024);

        assert_eq!(
            out.rect,
            CropRect {
                left: 100,
                top: 50,
                width: 512,
                height: 512
            }
        );
        assert!(!out.reset_frontend);
    }

    #[test]
    fn test_fixed_size_shifts_back_at_edges() {
        let mut req = request(900, 800, 512, 512, 1024, 1024);
        req.fixed_size_enabled = true;
        req.fixed_width = 512;
        req.fixed_height = 512;
        let out = normalize_crop(&req, 1024, 1024);

        // 900 + 512 > 1024, so the window slides back to 512
        assert_eq!(
            out.rect,
            CropRect {
                left: 512,
                top: 512,
                width: 512,
                height: 512
            }
        );
    }

    #[test]
    fn test_fixed_size_larger_than_image_takes_what_fits() {
        let mut req = request(0, 0, 640, 480, 640, 480);
        req.fixed_size_enabled = true;
        req.fixed_width = 2048;
        req.fixed_height = 2048;
        let out = normalize_crop(&req, 640, 480);

        assert_eq!(out.rect, CropRect::full(640, 480));
    }

    #[test]
    fn test_fixed_custom_uses_explicit_size() {
        let mut req = request(0, 0, 800, 600, 800, 600);
        req.fixed_size_enabled = true;
        req.fixed_size_preset = "Custom".to_string();
        req.fixed_width = 200;
        req.fixed_height = 100;
        let out = normalize_crop(&req, 800, 600);

        // Full-image rectangle counts as initial placement, so it centers
        assert_eq!(
            out.rect,
            CropRect {
                left: 300,
                top: 250,
                width: 200,
                height: 100
            }
        );
        assert!(out.reset_frontend);
    }

    #[test]
    fn test_fixed_malformed_preset_degrades_to_explicit() {
        let mut req = request(100, 100, 300, 300, 800, 600);
        req.fixed_size_enabled = true;
        req.fixed_size_preset = "banana".to_string();
        req.fixed_width = 300;
        req.fixed_height = 300;
        let out = normalize_crop(&req, 800, 600);

        assert_eq!(out.rect.width, 300);
        assert_eq!(out.rect.height, 300);
        assert_eq!((out.fixed_width, out.fixed_height), (300, 300));
    }

    #[test]
    fn test_fixed_preset_echoes_resolved_size() {
        let mut req = request(100, 100, 300, 300, 800, 600);
        req.fixed_size_enabled = true;
        req.fixed_size_preset = "640x480".to_string();
        // Explicit values are stale; the preset wins
        req.fixed_width = 11;
        req.fixed_height = 22;
        let out = normalize_crop(&req, 800, 600);

        assert_eq!((out.fixed_width, out.fixed_height), (640, 480));
        assert_eq!(out.rect.width, 640);
        assert_eq!(out.rect.height, 480);
    }

    #[test]
    fn test_fixed_size_on_resolution_change_recenters() {
        let mut req = request(700, 500, 512, 512, 2048, 2048);
        req.fixed_size_enabled = true;
        req.fixed_size_preset = "512x512".to_string();
        let out = normalize_crop(&req, 1024, 1024);

        assert_eq!(
            out.rect,
            CropRect {
                left: 256,
                top: 256,
                width: 512,
                height: 512
            }
        );
        assert!(out.reset_frontend);
    }

    #[test]
    fn test_fixed_size_odd_dimensions_center() {
        let mut req = request(0, 0, 101, 51, 101, 51);
        req.fixed_size_enabled = true;
        req.fixed_width = 25;
        req.fixed_height = 11;
        let out = normalize_crop(&req, 101, 51);

        // center 50 - 12 = 38, center 25 - 5 = 20
        assert_eq!(
            out.rect,
            CropRect {
                left: 38,
                top: 20,
                width: 25,
                height: 11
            }
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
