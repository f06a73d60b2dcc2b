//! Best-effort preview persistence.
//!
//! The front-end overlay draws on top of a static snapshot of the
//! incoming image. The first image of the batch is written as a PNG into
//! a caller-supplied temp directory, keyed by node identity and current
//! dimensions so re-runs on the same image overwrite in place. A failed
//! write is logged and the node keeps going without a preview.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;

use image::{GrayImage, RgbImage, RgbaImage};
use log::warn;
use thiserror::Error;

use crate::buffer::ImageBatch;

/// Why a preview could not be written. Never escapes the module's
/// public API; surfaced only through the warning log.
#[derive(Debug, Error)]
enum PreviewError {
    /// Channel counts other than 1/3/4 have no obvious pixel layout.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u32),

    /// Pixel container construction failed (dimension overflow).
    #[error("pixel buffer construction failed")]
    BufferConstruction,

    /// Temp directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding or writing failed.
    #[error("image write failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Stable preview file name for a node instance at a given image size.
///
/// Format: `dragcrop_original_<hash>.png`, where the hash covers the
/// node identity and the current dimensions.
pub fn preview_filename(node_id: &str, width: u32, height: u32) -> String {
    let mut hasher = DefaultHasher::new();
    node_id.hash(&mut hasher);
    width.hash(&mut hasher);
    height.hash(&mut hasher);
    format!("dragcrop_original_{:016x}.png", hasher.finish())
}

/// Write the first image of the batch as a PNG preview.
///
/// Returns the file name on success. Every failure degrades to `None`
/// with a warning; the crop result does not depend on the preview.
pub fn write_preview(image: &ImageBatch, node_id: &str, temp_dir: &Path) -> Option<String> {
    match try_write(image, node_id, temp_dir) {
        Ok(filename) => Some(filename),
        Err(err) => {
            warn!("error saving preview image: {err}");
            None
        }
    }
}

fn try_write(image: &ImageBatch, node_id: &str, temp_dir: &Path) -> Result<String, PreviewError> {
    let frame = image.frame(0);

    // Normalized float samples to 8-bit
    let bytes: Vec<u8> = frame
        .iter()
        .map(|&s| (s * 255.0).clamp(0.0, 255.0) as u8)
        .collect();

    let filename = preview_filename(node_id, image.width, image.height);
    std::fs::create_dir_all(temp_dir)?;
    let path = temp_dir.join(&filename);

    let (w, h) = (image.width, image.height);
    match image.channels {
        1 => GrayImage::from_raw(w, h, bytes)
            .ok_or(PreviewError::BufferConstruction)?
            .save(&path)?,
        3 => RgbImage::from_raw(w, h, bytes)
            .ok_or(PreviewError::BufferConstruction)?
            .save(&path)?,
        4 => RgbaImage::from_raw(w, h, bytes)
            .ok_or(PreviewError::BufferConstruction)?
            .save(&path)?,
        c => return Err(PreviewError::UnsupportedChannels(c)),
    }

    Ok(filename)
}
