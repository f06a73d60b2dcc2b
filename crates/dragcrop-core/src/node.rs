//! DragCrop node entry point.
//!
//! Ties the layers together: normalize the requested rectangle, slice
//! the image, reconcile the mask, and write the best-effort preview.
//! The metadata record in the output is what keeps the front-end
//! drawing overlay in sync with the backend-computed bounds.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::buffer::{ImageBatch, MaskBatch, MaskInput};
use crate::mask::reconcile_mask;
use crate::normalize::normalize_crop;
use crate::preview::write_preview;
use crate::CropRequest;

/// Metadata record consumed by the front-end drawing overlay.
///
/// Margins are always recomputed from the normalized origin and size,
/// so `left + width + right == original_size[0]` holds (and likewise
/// vertically) even when the request carried stale margins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropInfo {
    /// Left edge of the crop, in pixels.
    pub left: u32,
    /// Top edge of the crop, in pixels.
    pub top: u32,
    /// Margin to the image's right edge, in pixels.
    pub right: u32,
    /// Margin to the image's bottom edge, in pixels.
    pub bottom: u32,
    /// Crop width in pixels.
    pub width: u32,
    /// Crop height in pixels.
    pub height: u32,
    /// `[width, height]` of the incoming image.
    pub original_size: [u32; 2],
    /// `[width, height]` of the cropped output.
    pub cropped_size: [u32; 2],
    /// The overlay must discard its local rectangle and resync.
    pub reset_crop_ui: bool,
    /// Fixed-size mode toggle, echoed from the request.
    pub fixed_size_enabled: bool,
    /// Preset name, echoed from the request.
    pub fixed_size_preset: String,
    /// Fixed-size target width after preset resolution.
    pub fixed_width: u32,
    /// Fixed-size target height after preset resolution.
    pub fixed_height: u32,
}

/// Reference to a written preview image, in the shape the front-end
/// expects from the host's temp-image protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewImage {
    /// File name inside the temp directory.
    pub filename: String,
    /// Always empty; previews live at the temp root.
    pub subfolder: String,
    /// Always `"temp"`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl PreviewImage {
    fn temp(filename: String) -> Self {
        Self {
            filename,
            subfolder: String::new(),
            kind: "temp".to_string(),
        }
    }
}

/// Everything a node invocation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCropOutput {
    /// The cropped image batch.
    pub image: ImageBatch,
    /// The reconciled mask, always present (all-zero when the input had
    /// no usable mask).
    pub mask: MaskBatch,
    /// Metadata for the front-end overlay.
    pub info: CropInfo,
    /// Preview reference, when the best-effort write succeeded.
    pub preview: Option<PreviewImage>,
}

/// Run the DragCrop node.
///
/// # Arguments
///
/// * `request` - Crop rectangle and fixed-size state from the UI
/// * `image` - Incoming image batch, read-only
/// * `mask` - Optional mask tensor of compatible (or reconcilable) shape
/// * `preview_dir` - Temp directory for the preview write; `None`
///   disables the preview entirely
///
/// This function is total: invalid rectangles normalize to the full
/// image and a failed preview write only costs the preview (see the
/// module docs of [`crate::normalize`] and [`crate::preview`]).
pub fn drag_crop(
    request: &CropRequest,
    image: &ImageBatch,
    mask: Option<&MaskInput>,
    preview_dir: Option<&Path>,
) -> DragCropOutput {
    info!(
        "DragCrop node {} executed (drawing version {})",
        request.node_id, request.drawing_version
    );
    debug!(
        "incoming image: {}x{}, batch {}, channels {}",
        image.width, image.height, image.batch, image.channels
    );

    let normalized = normalize_crop(request, image.width, image.height);
    let rect = normalized.rect;

    let cropped = image.crop(rect);
    let cropped_mask = reconcile_mask(mask, rect, image.batch);

    let preview = preview_dir
        .and_then(|dir| write_preview(image, &request.node_id, dir))
        .map(PreviewImage::temp);

    debug!(
        "output crop: {}x{} at ({}, {}), reset={}",
        rect.width, rect.height, rect.left, rect.top, normalized.reset_frontend
    );

    let info = CropInfo {
        left: rect.left,
        top: rect.top,
        right: rect.right_margin(image.width),
        bottom: rect.bottom_margin(image.height),
        width: rect.width,
        height: rect.height,
        original_size: [image.width, image.height],
        cropped_size: [rect.width, rect.height],
        reset_crop_ui: normalized.reset_frontend,
        fixed_size_enabled: request.fixed_size_enabled,
        fixed_size_preset: request.fixed_size_preset.clone(),
        fixed_width: normalized.fixed_width,
        fixed_height: normalized.fixed_height,
    };

    DragCropOutput {
        image: cropped,
        mask: cropped_mask,
        info,
        preview,
    }
}
