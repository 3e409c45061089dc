//! Color transform engines
//!
//! The relabel/convert pipeline never computes colors itself. It hands sample
//! data, a source space, a destination space and a [`QualityPolicy`] to a
//! [`TransformEngine`]. [`MoxcmsEngine`] is the engine shipped with the crate.

use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::color_model::{ColorModel, ComponentModel, PackedModel, TransferType};
use crate::profile::ColorProfile;
use crate::space::{ColorSpace, SpaceFamily};

/// Errors reported by a transform engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// A profile could not be parsed or built
    #[error("Profile error: {0}")]
    Profile(String),

    /// The engine cannot convert between these spaces
    #[error("Unsupported color space pair: {from} -> {to} ({reason})")]
    UnsupportedPair {
        from: String,
        to: String,
        reason: String,
    },

    /// The engine cannot process this sample layout
    #[error("Unsupported sample layout: {0}")]
    UnsupportedLayout(String),

    /// The transform itself failed
    #[error("Transform execution failed: {0}")]
    Execution(String),
}

/// Rendering trade-off for one axis of the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderQuality {
    /// Favor speed
    Speed,
    /// Engine default
    #[default]
    Default,
    /// Favor quality
    Quality,
}

/// Quality settings handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityPolicy {
    /// General rendering quality
    pub rendering: RenderQuality,
    /// Color rendering quality
    pub color_rendering: RenderQuality,
    /// Dither when reducing precision
    pub dithering: bool,
}

impl QualityPolicy {
    /// Maximum rendering and color rendering quality, dithering enabled
    pub const MAX_QUALITY: Self = Self {
        rendering: RenderQuality::Quality,
        color_rendering: RenderQuality::Quality,
        dithering: true,
    };
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self::MAX_QUALITY
    }
}

/// Computes new sample values for a buffer in another color space
pub trait TransformEngine {
    /// Convert `buffer` from `from` to `to`
    ///
    /// The buffer's samples are read as being expressed in `from`, whatever
    /// its model says. The result holds new samples in `to`'s native layout.
    fn transform(
        &self,
        buffer: &PixelBuffer,
        from: &ColorSpace,
        to: &ColorSpace,
        policy: &QualityPolicy,
    ) -> Result<PixelBuffer, EngineError>;
}

impl<E: TransformEngine + ?Sized> TransformEngine for &E {
    fn transform(
        &self,
        buffer: &PixelBuffer,
        from: &ColorSpace,
        to: &ColorSpace,
        policy: &QualityPolicy,
    ) -> Result<PixelBuffer, EngineError> {
        (**self).transform(buffer, from, to, policy)
    }
}

/// Options for [`MoxcmsEngine`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Use CICP transfer functions when a profile carries them
    pub allow_use_cicp_transfer: bool,
}

/// Transform engine backed by moxcms
///
/// Component layouts with 8-bit, 16-bit and float samples are transformed
/// directly. Packed layouts are unpacked to 8 bits per channel, transformed
/// and repacked with their original masks; masks are expected to be
/// contiguous runs of bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoxcmsEngine {
    options: EngineOptions,
}

impl MoxcmsEngine {
    /// Engine with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit options
    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Engine options
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    fn transform_options(&self, policy: &QualityPolicy) -> moxcms::TransformOptions {
        let mut options = moxcms::TransformOptions {
            rendering_intent: moxcms::RenderingIntent::Perceptual,
            allow_use_cicp_transfer: self.options.allow_use_cicp_transfer,
            prefer_fixed_point: policy.rendering != RenderQuality::Quality,
            ..Default::default()
        };
        if policy.color_rendering == RenderQuality::Quality {
            options.interpolation_method = moxcms::InterpolationMethod::Tetrahedral;
        }
        // moxcms has no dithering stage
        options
    }

    fn transform_component(
        &self,
        buffer: &PixelBuffer,
        model: &ComponentModel,
        link: &ProfileLink<'_>,
    ) -> Result<PixelBuffer, EngineError> {
        let has_alpha = model.has_alpha();
        let src_layout = moxcms_layout(model.color_space().family(), has_alpha)?;
        let dst_layout = moxcms_layout(link.to.family(), has_alpha)?;

        let dst_model: ColorModel = ComponentModel::new(
            link.to.clone(),
            has_alpha,
            model.alpha_premultiplied(),
            model.transparency(),
            model.transfer_type(),
        )
        .into();
        let dst_len = buffer.pixel_count() * dst_model.bytes_per_pixel();

        let samples = match model.transfer_type() {
            TransferType::U8 => {
                let executor = link
                    .src
                    .inner()
                    .create_transform_8bit(
                        src_layout,
                        link.dst.inner(),
                        dst_layout,
                        link.options.clone(),
                    )
                    .map_err(|e| link.unsupported(e))?;
                let mut dst = vec![0u8; dst_len];
                executor
                    .transform(buffer.samples(), &mut dst)
                    .map_err(execution_error)?;
                dst
            }
            TransferType::U16 => {
                let executor = link
                    .src
                    .inner()
                    .create_transform_16bit(
                        src_layout,
                        link.dst.inner(),
                        dst_layout,
                        link.options.clone(),
                    )
                    .map_err(|e| link.unsupported(e))?;
                let src: Vec<u16> = bytemuck::pod_collect_to_vec(buffer.samples());
                let mut dst = vec![0u16; dst_len / 2];
                executor.transform(&src, &mut dst).map_err(execution_error)?;
                bytemuck::cast_slice(&dst).to_vec()
            }
            TransferType::F32 => {
                let executor = link
                    .src
                    .inner()
                    .create_transform_f32(
                        src_layout,
                        link.dst.inner(),
                        dst_layout,
                        link.options.clone(),
                    )
                    .map_err(|e| link.unsupported(e))?;
                let src: Vec<f32> = bytemuck::pod_collect_to_vec(buffer.samples());
                let mut dst = vec![0f32; dst_len / 4];
                executor.transform(&src, &mut dst).map_err(execution_error)?;
                bytemuck::cast_slice(&dst).to_vec()
            }
            TransferType::I32 => {
                return Err(EngineError::UnsupportedLayout(
                    "32-bit integer component samples".into(),
                ));
            }
        };

        PixelBuffer::new(buffer.width(), buffer.height(), dst_model, samples)
            .map_err(|e| EngineError::Execution(e.to_string()))
    }

    fn transform_packed(
        &self,
        buffer: &PixelBuffer,
        model: &PackedModel,
        link: &ProfileLink<'_>,
    ) -> Result<PixelBuffer, EngineError> {
        if model.color_space().family() != SpaceFamily::Rgb
            || link.to.family() != SpaceFamily::Rgb
        {
            return Err(EngineError::UnsupportedLayout(
                "packed pixels outside RGB spaces".into(),
            ));
        }
        if model.transfer_type() == TransferType::F32 {
            return Err(EngineError::UnsupportedLayout("float packed pixels".into()));
        }

        let unpacker = PackedChannels::new(model);
        let layout = moxcms_layout(SpaceFamily::Rgb, model.has_alpha())?;
        let src = unpacker.unpack(buffer.samples());
        let mut dst = vec![0u8; src.len()];

        let executor = link
            .src
            .inner()
            .create_transform_8bit(layout, link.dst.inner(), layout, link.options.clone())
            .map_err(|e| link.unsupported(e))?;
        executor.transform(&src, &mut dst).map_err(execution_error)?;

        let dst_model = ColorModel::Packed(model.clone()).derive(link.to).map_err(|e| {
            EngineError::UnsupportedLayout(e.to_string())
        })?;
        let samples = unpacker.pack(&dst);
        PixelBuffer::new(buffer.width(), buffer.height(), dst_model, samples)
            .map_err(|e| EngineError::Execution(e.to_string()))
    }
}

impl TransformEngine for MoxcmsEngine {
    fn transform(
        &self,
        buffer: &PixelBuffer,
        from: &ColorSpace,
        to: &ColorSpace,
        policy: &QualityPolicy,
    ) -> Result<PixelBuffer, EngineError> {
        let src = ColorProfile::for_space(from)?;
        let dst = ColorProfile::for_space(to)?;
        let link = ProfileLink {
            src: &src,
            dst: &dst,
            from,
            to,
            options: self.transform_options(policy),
        };

        match buffer.model() {
            ColorModel::Component(model) => self.transform_component(buffer, model, &link),
            ColorModel::Packed(model) => self.transform_packed(buffer, model, &link),
            ColorModel::Indexed(_) => Err(EngineError::UnsupportedLayout("indexed pixels".into())),
        }
    }
}

/// Profiles and options for one transform call
struct ProfileLink<'a> {
    src: &'a ColorProfile,
    dst: &'a ColorProfile,
    from: &'a ColorSpace,
    to: &'a ColorSpace,
    options: moxcms::TransformOptions,
}

impl ProfileLink<'_> {
    fn unsupported(&self, e: moxcms::CmsError) -> EngineError {
        EngineError::UnsupportedPair {
            from: format!("{:?}", self.from),
            to: format!("{:?}", self.to),
            reason: format!("{:?}", e),
        }
    }
}

fn execution_error(e: moxcms::CmsError) -> EngineError {
    EngineError::Execution(format!("{:?}", e))
}

/// moxcms layout for a channel family
fn moxcms_layout(family: SpaceFamily, has_alpha: bool) -> Result<moxcms::Layout, EngineError> {
    match (family, has_alpha) {
        (SpaceFamily::Rgb, false) => Ok(moxcms::Layout::Rgb),
        (SpaceFamily::Rgb, true) => Ok(moxcms::Layout::Rgba),
        (SpaceFamily::Gray, false) => Ok(moxcms::Layout::Gray),
        (SpaceFamily::Gray, true) => Ok(moxcms::Layout::GrayAlpha),
        // Four inks travel in the 4-channel layout
        (SpaceFamily::Cmyk, false) => Ok(moxcms::Layout::Rgba),
        (family, alpha) => Err(EngineError::UnsupportedLayout(format!(
            "{:?} samples{}",
            family,
            if alpha { " with alpha" } else { "" }
        ))),
    }
}

/// Shift and width of each used mask of a packed model
struct PackedChannels {
    transfer: TransferType,
    channels: Vec<(u32, u32)>,
}

impl PackedChannels {
    fn new(model: &PackedModel) -> Self {
        let masks = model.masks();
        let used = if model.has_alpha() { 4 } else { 3 };
        let channels = masks.as_array()[..used]
            .iter()
            .map(|&mask| (mask.trailing_zeros().min(31), mask.count_ones()))
            .collect();
        Self {
            transfer: model.transfer_type(),
            channels,
        }
    }

    fn read_word(&self, pixel: &[u8]) -> u32 {
        match self.transfer {
            TransferType::U8 => u32::from(pixel[0]),
            TransferType::U16 => u32::from(u16::from_ne_bytes([pixel[0], pixel[1]])),
            _ => u32::from_ne_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]),
        }
    }

    fn write_word(&self, word: u32, out: &mut Vec<u8>) {
        match self.transfer {
            TransferType::U8 => out.push(word as u8),
            TransferType::U16 => out.extend_from_slice(&(word as u16).to_ne_bytes()),
            _ => out.extend_from_slice(&word.to_ne_bytes()),
        }
    }

    /// Expand packed pixels to 8 bits per channel
    fn unpack(&self, samples: &[u8]) -> Vec<u8> {
        let step = self.transfer.bytes();
        let mut out = Vec::with_capacity(samples.len() / step * self.channels.len());
        for pixel in samples.chunks_exact(step) {
            let word = self.read_word(pixel);
            for &(shift, bits) in &self.channels {
                let value = (u64::from(word) >> shift) & max_value(bits);
                out.push(scale_to_8(value, bits));
            }
        }
        out
    }

    /// Pack 8-bit channels back into words
    fn pack(&self, expanded: &[u8]) -> Vec<u8> {
        let step = self.channels.len();
        let mut out = Vec::with_capacity(expanded.len() / step * self.transfer.bytes());
        for pixel in expanded.chunks_exact(step) {
            let mut word = 0u64;
            for (&value, &(shift, bits)) in pixel.iter().zip(&self.channels) {
                word |= scale_from_8(value, bits) << shift;
            }
            self.write_word(word as u32, &mut out);
        }
        out
    }
}

fn max_value(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

fn scale_to_8(value: u64, bits: u32) -> u8 {
    if bits == 0 {
        return 0;
    }
    let max = max_value(bits);
    ((value * 255 + max / 2) / max) as u8
}

fn scale_from_8(value: u8, bits: u32) -> u64 {
    let max = max_value(bits);
    (u64::from(value) * max + 127) / 255
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_model::{ChannelMasks, Transparency};
    use crate::space::NamedSpace;

    fn rgb8_buffer(space: &ColorSpace, samples: Vec<u8>) -> PixelBuffer {
        let model = ComponentModel::opaque(space.clone(), TransferType::U8);
        let width = (samples.len() / 3) as u32;
        PixelBuffer::new(width, 1, model.into(), samples).unwrap()
    }

    #[test]
    fn test_max_quality_policy() {
        let policy = QualityPolicy::default();
        assert_eq!(policy.rendering, RenderQuality::Quality);
        assert_eq!(policy.color_rendering, RenderQuality::Quality);
        assert!(policy.dithering);
    }

    #[test]
    fn test_scale_roundtrip_565() {
        for v in 0..32u64 {
            assert_eq!(scale_from_8(scale_to_8(v, 5), 5), v);
        }
        for v in 0..64u64 {
            assert_eq!(scale_from_8(scale_to_8(v, 6), 6), v);
        }
        assert_eq!(scale_to_8(31, 5), 255);
        assert_eq!(scale_to_8(0, 0), 0);
    }

    #[test]
    fn test_transform_identity() {
        let srgb = ColorSpace::srgb();
        let buffer = rgb8_buffer(&srgb, vec![255, 128, 64]);
        let out = MoxcmsEngine::new()
            .transform(&buffer, &srgb, &srgb, &QualityPolicy::MAX_QUALITY)
            .unwrap();

        let dst = out.samples();
        assert!((dst[0] as i32 - 255).abs() <= 1);
        assert!((dst[1] as i32 - 128).abs() <= 1);
        assert!((dst[2] as i32 - 64).abs() <= 1);
        assert!(ColorSpace::same(out.model().color_space(), &srgb));
    }

    #[test]
    fn test_transform_srgb_to_p3() {
        let srgb = ColorSpace::srgb();
        let p3 = ColorSpace::named(NamedSpace::DisplayP3);
        let buffer = rgb8_buffer(&srgb, vec![255, 0, 0]);

        let out = MoxcmsEngine::new()
            .transform(&buffer, &srgb, &p3, &QualityPolicy::MAX_QUALITY)
            .unwrap();

        // sRGB red is inside P3, so it loses saturation there
        let dst = out.samples();
        assert!(dst[0] < 255);
        assert!(dst[1] > 0);
    }

    #[test]
    fn test_transform_to_gray_changes_channels() {
        let srgb = ColorSpace::srgb();
        let gray = ColorSpace::named(NamedSpace::Gray);
        let buffer = rgb8_buffer(&srgb, vec![255, 255, 255, 0, 0, 0]);

        let out = MoxcmsEngine::new()
            .transform(&buffer, &srgb, &gray, &QualityPolicy::MAX_QUALITY)
            .unwrap();

        assert_eq!(out.samples().len(), 2);
        assert!(out.samples()[0] >= 254);
        assert!(out.samples()[1] <= 1);
    }

    #[test]
    fn test_transform_u16_alpha_kept() {
        let srgb = ColorSpace::srgb();
        let model = ComponentModel::new(
            srgb.clone(),
            true,
            false,
            Transparency::Translucent,
            TransferType::U16,
        );
        let pixel: [u16; 4] = [65535, 32768, 0, 12345];
        let samples = bytemuck::cast_slice(&pixel).to_vec();
        let buffer = PixelBuffer::new(1, 1, model.into(), samples).unwrap();

        let out = MoxcmsEngine::new()
            .transform(&buffer, &srgb, &srgb, &QualityPolicy::MAX_QUALITY)
            .unwrap();

        let dst: Vec<u16> = bytemuck::pod_collect_to_vec(out.samples());
        assert_eq!(dst[3], 12345);
        assert!((dst[0] as i32 - 65535).abs() <= 64);
    }

    #[test]
    fn test_transform_packed_565_identity() {
        let srgb = ColorSpace::srgb();
        let model = PackedModel::from_masks(srgb.clone(), ChannelMasks::RGB565).unwrap();
        let words: [u16; 2] = [0xF800, 0x07FF];
        let samples = bytemuck::cast_slice(&words).to_vec();
        let buffer = PixelBuffer::new(2, 1, model.into(), samples).unwrap();

        let out = MoxcmsEngine::new()
            .transform(&buffer, &srgb, &srgb, &QualityPolicy::MAX_QUALITY)
            .unwrap();

        let ColorModel::Packed(pcm) = out.model() else {
            panic!("expected packed model");
        };
        assert_eq!(pcm.masks(), ChannelMasks::RGB565);
        assert_eq!(pcm.bits_per_pixel(), 16);
        assert_eq!(out.samples(), buffer.samples());
    }

    #[test]
    fn test_transform_i32_components_unsupported() {
        let srgb = ColorSpace::srgb();
        let model = ComponentModel::opaque(srgb.clone(), TransferType::I32);
        let buffer = PixelBuffer::zeroed(1, 1, model.into()).unwrap();
        let err = MoxcmsEngine::new()
            .transform(&buffer, &srgb, &srgb, &QualityPolicy::MAX_QUALITY)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedLayout(_)));
    }

    #[test]
    fn test_malformed_profile_fails() {
        let srgb = ColorSpace::srgb();
        let broken = ColorSpace::from_icc(vec![0u8; 64]);
        let buffer = rgb8_buffer(&srgb, vec![1, 2, 3]);
        let err = MoxcmsEngine::new()
            .transform(&buffer, &broken, &srgb, &QualityPolicy::MAX_QUALITY)
            .unwrap_err();
        assert!(matches!(err, EngineError::Profile(_)));
    }
}
