//! Pixel buffers
//!
//! A [`PixelBuffer`] pairs a fixed grid of samples with the [`ColorModel`]
//! describing them. Samples live behind an `Arc`, so relabeling a buffer
//! produces a second buffer over the same storage. Writing through
//! [`PixelBuffer::samples_mut`] detaches the written buffer first; buffers
//! that shared its storage keep seeing the old samples.

use std::fmt;
use std::sync::Arc;

use crate::color_model::ColorModel;
use crate::{Error, Result};

/// Samples plus the color model they are expressed in
///
/// Rows are tightly packed. Samples are stored as native-endian bytes of the
/// model's transfer type.
#[derive(Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Arc<Vec<u8>>,
    model: ColorModel,
}

impl PixelBuffer {
    /// Wrap `samples` as a `width` x `height` buffer
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for an empty or overflowing grid and
    /// [`Error::BufferSize`] when `samples` does not hold exactly one pixel
    /// per grid cell.
    pub fn new(width: u32, height: u32, model: ColorModel, samples: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height, &model)?;
        if samples.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples: Arc::new(samples),
            model,
        })
    }

    /// Allocate a zero-filled buffer
    pub fn zeroed(width: u32, height: u32, model: ColorModel) -> Result<Self> {
        let len = Self::byte_len(width, height, &model)?;
        Self::new(width, height, model, vec![0u8; len])
    }

    fn byte_len(width: u32, height: u32, model: &ColorModel) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(model.bytes_per_pixel()))
            .ok_or(Error::InvalidDimensions { width, height })
    }

    /// Image width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Current color model
    pub fn model(&self) -> &ColorModel {
        &self.model
    }

    /// Raw sample bytes
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Mutable sample bytes
    ///
    /// Copies the storage first if another buffer still shares it.
    pub fn samples_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.samples).as_mut_slice()
    }

    /// Whether both buffers read from the same sample storage
    pub fn shares_samples_with(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }

    /// Consume the buffer and return its samples, copying only if shared
    pub fn into_samples(self) -> Vec<u8> {
        Arc::try_unwrap(self.samples).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    /// Same storage under another model; callers check compatibility
    pub(crate) fn with_model(&self, model: ColorModel) -> Self {
        Self {
            width: self.width,
            height: self.height,
            samples: Arc::clone(&self.samples),
            model,
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {} {:?} in {:?})",
            self.width,
            self.height,
            self.model.kind(),
            self.model.transfer_type(),
            self.model.color_space()
        )
    }
}
