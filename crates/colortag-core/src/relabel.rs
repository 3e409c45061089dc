//! Color space relabeling
//!
//! Relabeling attaches a different color space to a buffer without touching
//! its samples. Use it when a decoder assumed the wrong space (typically sRGB)
//! and the real one is known; use [`SpaceConverter`](crate::SpaceConverter)
//! when sample values must actually change.

use std::sync::Arc;

use crate::buffer::PixelBuffer;
use crate::color_model::{ColorModel, derive_color_model};
use crate::space::ColorSpace;
use crate::{Error, Result};

/// Retag `buffer` with `color_space`, keeping its bit layout
///
/// The returned buffer shares sample storage with `buffer`.
pub fn relabel_color_space(buffer: &PixelBuffer, color_space: &ColorSpace) -> Result<PixelBuffer> {
    let model = derive_color_model(buffer.model(), color_space, false)?;
    relabel_with_model(buffer, model)
}

/// Retag `buffer` with an explicit model
///
/// # Errors
///
/// Returns [`Error::IncompatibleModel`] when `model` would need a different
/// number of bytes per pixel than `buffer` stores.
pub fn relabel_with_model(buffer: &PixelBuffer, model: ColorModel) -> Result<PixelBuffer> {
    let expected = buffer.model().bytes_per_pixel();
    let actual = model.bytes_per_pixel();
    if expected != actual {
        return Err(Error::IncompatibleModel { expected, actual });
    }
    Ok(buffer.with_model(model))
}

/// Retag `buffer` with the space described by an ICC profile
pub fn relabel_icc_profile(
    buffer: &PixelBuffer,
    profile: impl Into<Arc<[u8]>>,
) -> Result<PixelBuffer> {
    relabel_color_space(buffer, &ColorSpace::from_icc(profile))
}
