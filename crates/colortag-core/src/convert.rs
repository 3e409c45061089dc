//! Color space conversion
//!
//! [`SpaceConverter`] runs a [`TransformEngine`] between two relabel steps:
//! the input is first retagged with the space the caller asserts it is really
//! in, and the engine's output is retagged with the destination space. This
//! corrects buffers whose stored tag is wrong, and guards against engines that
//! tag their own output inaccurately.

use std::sync::Arc;

use crate::buffer::PixelBuffer;
use crate::profile::ProfileSource;
use crate::relabel::relabel_color_space;
use crate::space::ColorSpace;
use crate::transform::{MoxcmsEngine, QualityPolicy, TransformEngine};
use crate::Result;

/// Converts pixel buffers between color spaces
///
/// Every call is independent; the converter holds no state besides its
/// engine. The quality policy is fixed at [`QualityPolicy::MAX_QUALITY`].
#[derive(Debug, Clone, Default)]
pub struct SpaceConverter<E = MoxcmsEngine> {
    engine: E,
}

impl SpaceConverter<MoxcmsEngine> {
    /// Converter backed by moxcms
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: TransformEngine> SpaceConverter<E> {
    /// Converter backed by `engine`
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// The engine doing the color math
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Quality policy passed to every engine call
    pub fn policy(&self) -> QualityPolicy {
        QualityPolicy::MAX_QUALITY
    }

    fn run_engine(
        &self,
        buffer: &PixelBuffer,
        from: &ColorSpace,
        to: &ColorSpace,
    ) -> Result<PixelBuffer> {
        Ok(self
            .engine
            .transform(buffer, from, to, &QualityPolicy::MAX_QUALITY)?)
    }

    /// Convert `buffer`, whose samples are really in `from`, into `to`
    ///
    /// The buffer's own tag is ignored.
    pub fn convert(
        &self,
        buffer: &PixelBuffer,
        from: &ColorSpace,
        to: &ColorSpace,
    ) -> Result<PixelBuffer> {
        let tagged = relabel_color_space(buffer, from)?;
        let converted = self.run_engine(&tagged, from, to)?;
        relabel_color_space(&converted, to)
    }

    /// Convert through two engine passes
    ///
    /// Compatibility shim for engines whose first pass leaves the output
    /// tagged as `from`: the intermediate result is retagged as `from` and
    /// transformed again before the final `to` tag is applied. Do not use it
    /// with an engine that tags its output correctly, since the samples are
    /// transformed twice.
    pub fn convert_via_double_hop(
        &self,
        buffer: &PixelBuffer,
        from: &ColorSpace,
        to: &ColorSpace,
    ) -> Result<PixelBuffer> {
        let tagged = relabel_color_space(buffer, from)?;
        let first = self.run_engine(&tagged, from, to)?;
        let retagged = relabel_color_space(&first, from)?;
        let second = self.run_engine(&retagged, from, to)?;
        relabel_color_space(&second, to)
    }

    /// Convert from the buffer's own tag into `to`
    pub fn convert_to_current_space(
        &self,
        buffer: &PixelBuffer,
        to: &ColorSpace,
    ) -> Result<PixelBuffer> {
        let from = buffer.model().color_space().clone();
        let converted = self.run_engine(buffer, &from, to)?;
        relabel_color_space(&converted, to)
    }

    /// Convert from the buffer's own tag into the device space (sRGB)
    pub fn convert_to_device(&self, buffer: &PixelBuffer) -> Result<PixelBuffer> {
        self.convert_to_current_space(buffer, &ColorSpace::device())
    }

    /// Convert from `from` into the device space (sRGB)
    pub fn convert_from(&self, buffer: &PixelBuffer, from: &ColorSpace) -> Result<PixelBuffer> {
        self.convert(buffer, from, &ColorSpace::device())
    }

    /// Convert from the space of an ICC profile into the device space
    pub fn convert_from_icc_profile(
        &self,
        buffer: &PixelBuffer,
        profile: impl Into<Arc<[u8]>>,
    ) -> Result<PixelBuffer> {
        self.convert_from(buffer, &ColorSpace::from_icc(profile))
    }

    /// Convert from the buffer's own tag into the space of an ICC profile
    pub fn convert_to_icc_profile(
        &self,
        buffer: &PixelBuffer,
        profile: impl Into<Arc<[u8]>>,
    ) -> Result<PixelBuffer> {
        self.convert_to_current_space(buffer, &ColorSpace::from_icc(profile))
    }

    /// Convert between the spaces of two ICC profiles
    pub fn convert_between_icc_profiles(
        &self,
        buffer: &PixelBuffer,
        from: impl Into<Arc<[u8]>>,
        to: impl Into<Arc<[u8]>>,
    ) -> Result<PixelBuffer> {
        self.convert(
            buffer,
            &ColorSpace::from_icc(from),
            &ColorSpace::from_icc(to),
        )
    }

    /// Bring an image into the device space using its associated profile
    ///
    /// Without a profile the buffer is handed back untouched.
    pub fn correct_image(
        &self,
        buffer: PixelBuffer,
        profile: Option<&[u8]>,
    ) -> Result<PixelBuffer> {
        match profile {
            None => Ok(buffer),
            Some(profile) => self.convert_from_icc_profile(&buffer, profile),
        }
    }

    /// Like [`correct_image`](Self::correct_image), loading the profile from `source`
    pub fn correct_image_from(
        &self,
        buffer: PixelBuffer,
        source: &impl ProfileSource,
    ) -> Result<PixelBuffer> {
        let profile = source.load_associated_profile()?;
        self.correct_image(buffer, profile.as_deref())
    }
}
