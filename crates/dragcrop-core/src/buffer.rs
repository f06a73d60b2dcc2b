//! Owned pixel and mask buffers exchanged with the host.
//!
//! The host hands batched image tensors in `[batch][row][col][channel]`
//! order with float samples normalized to 0.0-1.0. Masks arrive with
//! whatever rank the upstream graph produced; they are kept as an
//! untyped shape + data pair until [`crate::mask::reconcile_mask`]
//! normalizes them.

use thiserror::Error;

use crate::normalize::CropRect;

/// Errors for buffer construction from raw host data.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Sample count doesn't match the declared dimensions.
    #[error("Invalid sample data: expected {expected} samples, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// One of the declared dimensions is zero.
    #[error("Invalid dimensions: {0} must be non-zero")]
    ZeroDimension(&'static str),
}

/// A batch of decoded images with float samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    /// Number of images in the batch.
    pub batch: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Image width in pixels.
    pub width: u32,
    /// Samples per pixel (1 = grayscale, 3 = RGB, 4 = RGBA).
    pub channels: u32,
    /// Sample data in `[batch][row][col][channel]` order, normalized 0.0-1.0.
    /// Length is batch * height * width * channels.
    pub data: Vec<f32>,
}

impl ImageBatch {
    /// Create an `ImageBatch`, validating dimensions against the data length.
    pub fn new(
        batch: u32,
        height: u32,
        width: u32,
        channels: u32,
        data: Vec<f32>,
    ) -> Result<Self, BufferError> {
        if batch == 0 {
            return Err(BufferError::ZeroDimension("batch"));
        }
        if height == 0 {
            return Err(BufferError::ZeroDimension("height"));
        }
        if width == 0 {
            return Err(BufferError::ZeroDimension("width"));
        }
        if channels == 0 {
            return Err(BufferError::ZeroDimension("channels"));
        }

        let expected = batch as usize * height as usize * width as usize * channels as usize;
        if data.len() != expected {
            return Err(BufferError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            batch,
            height,
            width,
            channels,
            data,
        })
    }

    /// Samples in a single image of the batch.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.height as usize * self.width as usize * self.channels as usize
    }

    /// Borrow the samples of one image in the batch.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.batch`.
    pub fn frame(&self, index: u32) -> &[f32] {
        assert!(index < self.batch, "frame index out of range");
        let len = self.frame_len();
        let start = index as usize * len;
        &self.data[start..start + len]
    }

    /// Extract a crop window, preserving batch and channel dimensions.
    ///
    /// `rect` must already be normalized against this image's dimensions
    /// (see [`crate::normalize::normalize_crop`]); the window is assumed
    /// in-bounds.
    pub fn crop(&self, rect: CropRect) -> ImageBatch {
        debug_assert!(rect.right_edge() <= self.width, "crop exceeds width");
        debug_assert!(rect.bottom_edge() <= self.height, "crop exceeds height");

        // Fast path: full-image crop returns a clone
        if rect.left == 0 && rect.top == 0 && rect.width == self.width && rect.height == self.height
        {
            return self.clone();
        }

        let channels = self.channels as usize;
        let src_row = self.width as usize * channels;
        let out_w = rect.width as usize;
        let out_h = rect.height as usize;
        let frame_len = self.frame_len();

        let mut data = Vec::with_capacity(self.batch as usize * out_h * out_w * channels);

        // Copy row by row; each row of the window is contiguous in the source
        for b in 0..self.batch as usize {
            let frame_start = b * frame_len;
            for y in 0..out_h {
                let src_y = rect.top as usize + y;
                let start = frame_start + src_y * src_row + rect.left as usize * channels;
                data.extend_from_slice(&self.data[start..start + out_w * channels]);
            }
        }

        ImageBatch {
            batch: self.batch,
            height: rect.height,
            width: rect.width,
            channels: self.channels,
            data,
        }
    }
}

/// A mask tensor as supplied by the host, rank not yet reconciled.
///
/// Accepted shapes are `(batch, height, width)`, a bare `(height, width)`,
/// and `(batch, height, width, 1)` with a channel-squeeze dimension.
/// Anything else is carried through and degrades to an all-zero mask
/// during reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskInput {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl MaskInput {
    /// Create a `MaskInput`, validating the data length against the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, BufferError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(BufferError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// The tensor shape as supplied by the host.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The raw mask samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// A reconciled per-pixel mask, always `(batch, height, width)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskBatch {
    /// Number of masks in the batch.
    pub batch: u32,
    /// Mask height in pixels.
    pub height: u32,
    /// Mask width in pixels.
    pub width: u32,
    /// Mask samples in `[batch][row][col]` order.
    pub data: Vec<f32>,
}

impl MaskBatch {
    /// All-zero mask of the given shape.
    pub fn zeros(batch: u32, height: u32, width: u32) -> Self {
        Self {
            batch,
            height,
            width,
            data: vec![0.0; batch as usize * height as usize * width as usize],
        }
    }

    /// Samples in a single mask of the batch.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.height as usize * self.width as usize
    }

    /// True if every sample is zero.
    pub fn is_all_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }
}
