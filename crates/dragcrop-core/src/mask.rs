//! Mask reconciliation.
//!
//! Upstream graphs are sloppy about mask shapes: a mask may arrive as
//! `(B, H, W)`, a bare `(H, W)`, or `(B, H, W, 1)`, with a batch count
//! that doesn't match the image and dimensions that don't match the crop.
//! This module folds all of that into a `(batch, crop_h, crop_w)` mask,
//! degrading to all-zero instead of erroring.
//!
//! # Reconciliation steps
//!
//! 1. Rank: squeeze a trailing singleton channel dim, promote a bare 2-D
//!    mask to a one-mask batch; any other rank degrades to zeros
//! 2. Batch: broadcast a single mask to every image, truncate a surplus,
//!    ceiling-tile a shortage
//! 3. Window: clamp the crop window against the mask's own dimensions,
//!    then copy what remains into the top-left of a zeroed output

use log::warn;

use crate::buffer::{MaskBatch, MaskInput};
use crate::normalize::CropRect;

/// Reconcile an optional host mask with the crop window.
///
/// # Arguments
///
/// * `mask` - Mask tensor as supplied by the host, if any
/// * `rect` - The normalized crop window (image coordinates)
/// * `batch` - Batch count of the image being cropped
///
/// # Returns
///
/// A mask of shape `(batch, rect.height, rect.width)`, all-zero when the
/// mask is absent, unusable, or entirely outside the crop window.
pub fn reconcile_mask(mask: Option<&MaskInput>, rect: CropRect, batch: u32) -> MaskBatch {
    let Some(mask) = mask else {
        return MaskBatch::zeros(batch, rect.height, rect.width);
    };

    let Some((mask_batch, mask_h, mask_w)) = normalized_shape(mask.shape()) else {
        warn!(
            "unusable mask shape {:?}, substituting all-zero mask",
            mask.shape()
        );
        return MaskBatch::zeros(batch, rect.height, rect.width);
    };

    if mask_batch == 0 || mask_h == 0 || mask_w == 0 {
        warn!("empty mask tensor, substituting all-zero mask");
        return MaskBatch::zeros(batch, rect.height, rect.width);
    }

    // Clamp the crop window against the mask's own dimensions, which may
    // differ from the image's
    let x0 = (rect.left as usize).min(mask_w);
    let x1 = (rect.right_edge() as usize).min(mask_w);
    let y0 = (rect.top as usize).min(mask_h);
    let y1 = (rect.bottom_edge() as usize).min(mask_h);

    if x1 <= x0 || y1 <= y0 {
        return MaskBatch::zeros(batch, rect.height, rect.width);
    }

    let copy_w = x1 - x0;
    let copy_h = y1 - y0;
    debug_assert!(copy_w <= rect.width as usize);
    debug_assert!(copy_h <= rect.height as usize);

    let mut out = MaskBatch::zeros(batch, rect.height, rect.width);
    let out_frame = out.frame_len();
    let out_w = rect.width as usize;
    let src_frame = mask_h * mask_w;
    let data = mask.data();

    for b in 0..batch as usize {
        let src_index = source_frame(b, mask_batch, batch as usize);
        let src_base = src_index * src_frame;
        let dst_base = b * out_frame;
        for row in 0..copy_h {
            let src_start = src_base + (y0 + row) * mask_w + x0;
            let dst_start = dst_base + row * out_w;
            out.data[dst_start..dst_start + copy_w]
                .copy_from_slice(&data[src_start..src_start + copy_w]);
        }
    }

    out
}

/// Fold the host-supplied shape into `(batch, height, width)`.
///
/// Returns `None` for ranks that cannot be reconciled.
fn normalized_shape(shape: &[usize]) -> Option<(usize, usize, usize)> {
    match shape {
        // Channel-squeeze dimension
        [b, h, w, 1] => Some((*b, *h, *w)),
        // Single 2-D mask becomes a one-mask batch
        [h, w] => Some((1, *h, *w)),
        [b, h, w] => Some((*b, *h, *w)),
        _ => None,
    }
}

/// Map an output batch index to a source mask index.
///
/// Broadcast (1 -> N), truncate (M > N), or ceiling-tile (1 < M < N).
#[inline]
fn source_frame(index: usize, mask_batch: usize, image_batch: usize) -> usize {
    if mask_batch >= image_batch {
        index
    } else {
        index % mask_batch
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
