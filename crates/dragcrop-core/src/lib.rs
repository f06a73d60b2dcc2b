//! DragCrop Core - crop normalization for a node-based image host
//!
//! This crate implements the backend half of an interactive drag-crop
//! node: validate the rectangle the front-end drew against the image
//! that actually arrived, slice the image and mask, and hand back the
//! metadata the drawing overlay needs to stay in sync.
//!
//! The host runtime, the drawing UI itself, and general image I/O are
//! external collaborators; the crate only touches the filesystem for
//! the best-effort preview write in [`preview`].

pub mod buffer;
pub mod mask;
pub mod node;
pub mod normalize;
pub mod preset;
pub mod preview;

pub use buffer::{BufferError, ImageBatch, MaskBatch, MaskInput};
pub use mask::reconcile_mask;
pub use node::{drag_crop, CropInfo, DragCropOutput, PreviewImage};
pub use normalize::{normalize_crop, CropRect, NormalizedCrop};
pub use preset::{parse_preset, CUSTOM_PRESET, DEFAULT_SIZE_PRESETS};
pub use preview::{preview_filename, write_preview};

/// Crop rectangle and fixed-size state as drawn by the front-end.
///
/// Margins and sizes are signed because they mirror UI state that may
/// be stale or mid-edit; normalization treats anything out of bounds as
/// a request for the full image. `last_width`/`last_height` are the
/// dimensions the rectangle was drawn against; the caller persists them
/// between runs, this crate keeps no state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CropRequest {
    /// Opaque front-end drawing-state version, echoed into logs.
    pub drawing_version: String,
    /// Opaque node-identity token; keys the preview file name.
    pub node_id: String,
    /// Left margin of the drawn rectangle, in pixels.
    pub left: i32,
    /// Top margin of the drawn rectangle, in pixels.
    pub top: i32,
    /// Right margin as last seen by the UI. Accepted for round-tripping
    /// UI state; outputs always recompute it from origin and size.
    pub right: i32,
    /// Bottom margin as last seen by the UI; recomputed on output.
    pub bottom: i32,
    /// Requested crop width, in pixels.
    pub width: i32,
    /// Requested crop height, in pixels.
    pub height: i32,
    /// Image width the rectangle was drawn against (0 = never ran).
    pub last_width: u32,
    /// Image height the rectangle was drawn against (0 = never ran).
    pub last_height: u32,
    /// Constrain the crop to a fixed target size.
    pub fixed_size_enabled: bool,
    /// Target size preset (`"<W>x<H>"`), or `"Custom"` for the explicit
    /// fixed width/height.
    pub fixed_size_preset: String,
    /// Explicit fixed-size width, used when the preset is `"Custom"`.
    pub fixed_width: u32,
    /// Explicit fixed-size height, used when the preset is `"Custom"`.
    pub fixed_height: u32,
}

impl Default for CropRequest {
    fn default() -> Self {
        Self {
            drawing_version: "init".to_string(),
            node_id: String::new(),
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
            width: 512,
            height: 512,
            last_width: 0,
            last_height: 0,
            fixed_size_enabled: false,
            fixed_size_preset: preset::CUSTOM_PRESET.to_string(),
            fixed_width: 512,
            fixed_height: 512,
        }
    }
}
