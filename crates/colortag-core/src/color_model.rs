//! Color model descriptors
//!
//! A [`ColorModel`] describes how the samples of a pixel buffer are laid out
//! and which color space they are expressed in. Two layouts are understood:
//!
//! - [`ComponentModel`]: one independently addressable sample per channel.
//! - [`PackedModel`]: all channels of a pixel packed into one integer through
//!   non-overlapping bit masks.
//!
//! [`IndexedModel`] describes palette images. It can be attached to buffers
//! but cannot be rebuilt under another color space.
//!
//! [`derive_color_model`] rebuilds a model with an identical bit layout under a
//! different color space. It never looks at sample data.

use crate::space::ColorSpace;
use crate::{Error, Result};

/// Storage type of one sample (component layouts) or one pixel (packed layouts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferType {
    /// Unsigned 8-bit
    U8,
    /// Unsigned 16-bit
    U16,
    /// 32-bit integer
    I32,
    /// 32-bit float
    F32,
}

impl TransferType {
    /// Size of one transfer element in bytes
    pub fn bytes(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::I32 | Self::F32 => 4,
        }
    }

    /// Smallest integer transfer type holding `bits` bits
    pub fn for_bits(bits: u32) -> Self {
        match bits {
            0..=8 => Self::U8,
            9..=16 => Self::U16,
            _ => Self::I32,
        }
    }
}

/// How a model treats transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transparency {
    /// Every pixel is fully opaque
    Opaque,
    /// Pixels are either fully opaque or fully transparent
    Bitmask,
    /// Arbitrary alpha
    Translucent,
}

/// Bit masks of a packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelMasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
}

impl ChannelMasks {
    /// 5-6-5 RGB in 16 bits
    pub const RGB565: Self = Self::new(0xF800, 0x07E0, 0x001F, 0);
    /// 8-bit RGB in the low 24 bits
    pub const RGB888: Self = Self::new(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0);
    /// 8-bit ARGB in 32 bits
    pub const ARGB8888: Self = Self::new(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000);

    /// Build a mask set
    pub const fn new(red: u32, green: u32, blue: u32, alpha: u32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Bitwise union of all masks
    pub fn union(&self) -> u32 {
        self.red | self.green | self.blue | self.alpha
    }

    /// Number of bits covered by the masks
    pub fn bit_count(&self) -> u32 {
        self.union().count_ones()
    }

    /// Masks in red, green, blue, alpha order
    pub fn as_array(&self) -> [u32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// First nonzero mask whose set bits are not adjacent
    pub fn non_contiguous(&self) -> Option<u32> {
        self.as_array().into_iter().find(|&mask| {
            let run = mask >> mask.trailing_zeros().min(31);
            mask != 0 && run & run.wrapping_add(1) != 0
        })
    }

    /// Whether any two masks share a bit
    pub fn overlapping(&self) -> Option<u32> {
        let masks = self.as_array();
        let mut seen = 0u32;
        for mask in masks {
            if seen & mask != 0 {
                return Some(seen & mask);
            }
            seen |= mask;
        }
        None
    }
}

/// One sample per channel
#[derive(Debug, Clone)]
pub struct ComponentModel {
    color_space: ColorSpace,
    has_alpha: bool,
    alpha_premultiplied: bool,
    transparency: Transparency,
    transfer_type: TransferType,
}

impl ComponentModel {
    pub fn new(
        color_space: ColorSpace,
        has_alpha: bool,
        alpha_premultiplied: bool,
        transparency: Transparency,
        transfer_type: TransferType,
    ) -> Self {
        Self {
            color_space,
            has_alpha,
            alpha_premultiplied,
            transparency,
            transfer_type,
        }
    }

    /// Opaque model without alpha
    pub fn opaque(color_space: ColorSpace, transfer_type: TransferType) -> Self {
        Self::new(
            color_space,
            false,
            false,
            Transparency::Opaque,
            transfer_type,
        )
    }

    /// Translucent model with straight alpha
    pub fn with_alpha(color_space: ColorSpace, transfer_type: TransferType) -> Self {
        Self::new(
            color_space,
            true,
            false,
            Transparency::Translucent,
            transfer_type,
        )
    }

    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn alpha_premultiplied(&self) -> bool {
        self.alpha_premultiplied
    }

    pub fn transparency(&self) -> Transparency {
        self.transparency
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    /// Channels per pixel, alpha included
    pub fn channels(&self) -> usize {
        self.color_space.channels() + usize::from(self.has_alpha)
    }
}

/// All channels packed into one integer per pixel
#[derive(Debug, Clone)]
pub struct PackedModel {
    color_space: ColorSpace,
    masks: ChannelMasks,
    bits_per_pixel: u32,
    alpha_premultiplied: bool,
    transfer_type: TransferType,
}

impl PackedModel {
    /// Create a packed model
    ///
    /// `bits_per_pixel` is stored as declared, even when it disagrees with the
    /// masks; [`derive_color_model`] recomputes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverlappingMasks`] when two masks share a bit,
    /// [`Error::NonContiguousMask`] when a mask has gaps, and
    /// [`Error::MasksExceedTransfer`] when a mask reaches past the transfer word.
    pub fn new(
        color_space: ColorSpace,
        masks: ChannelMasks,
        bits_per_pixel: u32,
        alpha_premultiplied: bool,
        transfer_type: TransferType,
    ) -> Result<Self> {
        if let Some(shared) = masks.overlapping() {
            return Err(Error::OverlappingMasks(shared));
        }
        if let Some(mask) = masks.non_contiguous() {
            return Err(Error::NonContiguousMask(mask));
        }
        let width = 32 - masks.union().leading_zeros();
        let bits = transfer_type.bytes() as u32 * 8;
        if width > bits {
            return Err(Error::MasksExceedTransfer {
                masks: masks.union(),
                bits,
            });
        }
        Ok(Self {
            color_space,
            masks,
            bits_per_pixel,
            alpha_premultiplied,
            transfer_type,
        })
    }

    /// Packed model whose bit count and transfer type follow from the masks
    pub fn from_masks(color_space: ColorSpace, masks: ChannelMasks) -> Result<Self> {
        let bits = masks.bit_count();
        let transfer = TransferType::for_bits(32 - masks.union().leading_zeros());
        Self::new(color_space, masks, bits, false, transfer)
    }

    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    pub fn masks(&self) -> ChannelMasks {
        self.masks
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    pub fn alpha_premultiplied(&self) -> bool {
        self.alpha_premultiplied
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn has_alpha(&self) -> bool {
        self.masks.alpha != 0
    }
}

/// Palette indices, one per transfer element
#[derive(Debug, Clone)]
pub struct IndexedModel {
    color_space: ColorSpace,
    bits_per_pixel: u32,
    palette_len: usize,
    transfer_type: TransferType,
}

impl IndexedModel {
    pub fn new(color_space: ColorSpace, bits_per_pixel: u32, palette_len: usize) -> Self {
        Self {
            color_space,
            bits_per_pixel,
            palette_len,
            transfer_type: TransferType::for_bits(bits_per_pixel),
        }
    }

    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    pub fn palette_len(&self) -> usize {
        self.palette_len
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }
}

/// Sample layout plus color space of a pixel buffer
#[derive(Debug, Clone)]
pub enum ColorModel {
    Component(ComponentModel),
    Packed(PackedModel),
    Indexed(IndexedModel),
}

impl ColorModel {
    /// Short name of the layout kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Packed(_) => "packed",
            Self::Indexed(_) => "indexed",
        }
    }

    pub fn color_space(&self) -> &ColorSpace {
        match self {
            Self::Component(m) => m.color_space(),
            Self::Packed(m) => m.color_space(),
            Self::Indexed(m) => m.color_space(),
        }
    }

    pub fn transfer_type(&self) -> TransferType {
        match self {
            Self::Component(m) => m.transfer_type(),
            Self::Packed(m) => m.transfer_type(),
            Self::Indexed(m) => m.transfer_type(),
        }
    }

    pub fn has_alpha(&self) -> bool {
        match self {
            Self::Component(m) => m.has_alpha(),
            Self::Packed(m) => m.has_alpha(),
            Self::Indexed(_) => false,
        }
    }

    /// Bytes one pixel occupies in sample storage
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Component(m) => m.channels() * m.transfer_type().bytes(),
            Self::Packed(m) => m.transfer_type().bytes(),
            Self::Indexed(m) => m.transfer_type().bytes(),
        }
    }

    /// Whether both models describe the same bit layout, ignoring color space
    pub fn same_layout(&self, other: &ColorModel) -> bool {
        match (self, other) {
            (Self::Component(a), Self::Component(b)) => {
                a.has_alpha == b.has_alpha
                    && a.alpha_premultiplied == b.alpha_premultiplied
                    && a.transparency == b.transparency
                    && a.transfer_type == b.transfer_type
                    && a.channels() == b.channels()
            }
            (Self::Packed(a), Self::Packed(b)) => {
                a.masks == b.masks
                    && a.bits_per_pixel == b.bits_per_pixel
                    && a.alpha_premultiplied == b.alpha_premultiplied
                    && a.transfer_type == b.transfer_type
            }
            (Self::Indexed(a), Self::Indexed(b)) => {
                a.bits_per_pixel == b.bits_per_pixel
                    && a.palette_len == b.palette_len
                    && a.transfer_type == b.transfer_type
            }
            _ => false,
        }
    }

    /// Same layout under `color_space`, alpha kept
    pub fn derive(&self, color_space: &ColorSpace) -> Result<ColorModel> {
        derive_color_model(self, color_space, false)
    }
}

impl From<ComponentModel> for ColorModel {
    fn from(model: ComponentModel) -> Self {
        Self::Component(model)
    }
}

impl From<PackedModel> for ColorModel {
    fn from(model: PackedModel) -> Self {
        Self::Packed(model)
    }
}

impl From<IndexedModel> for ColorModel {
    fn from(model: IndexedModel) -> Self {
        Self::Indexed(model)
    }
}

/// Rebuild `model` with the same bit layout under `color_space`
///
/// With `force_no_alpha`, component models come back opaque and without alpha.
/// Packed models always keep their masks, and their bit count is recomputed
/// from the masks rather than copied.
///
/// # Errors
///
/// Returns [`Error::UnsupportedLayout`] for indexed models.
pub fn derive_color_model(
    model: &ColorModel,
    color_space: &ColorSpace,
    force_no_alpha: bool,
) -> Result<ColorModel> {
    match model {
        ColorModel::Component(ccm) => {
            if force_no_alpha {
                return Ok(ComponentModel::opaque(color_space.clone(), ccm.transfer_type).into());
            }
            Ok(ComponentModel::new(
                color_space.clone(),
                ccm.has_alpha,
                ccm.alpha_premultiplied,
                ccm.transparency,
                ccm.transfer_type,
            )
            .into())
        }
        ColorModel::Packed(pcm) => {
            // Masks were non-overlapping at construction
            Ok(ColorModel::Packed(PackedModel {
                color_space: color_space.clone(),
                masks: pcm.masks,
                bits_per_pixel: pcm.masks.bit_count(),
                alpha_premultiplied: pcm.alpha_premultiplied,
                transfer_type: pcm.transfer_type,
            }))
        }
        ColorModel::Indexed(_) => Err(Error::UnsupportedLayout {
            kind: model.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::NamedSpace;

    #[test]
    fn test_component_keeps_alpha() {
        let model: ColorModel = ComponentModel::new(
            ColorSpace::srgb(),
            true,
            true,
            Transparency::Translucent,
            TransferType::U16,
        )
        .into();
        let target = ColorSpace::named(NamedSpace::AdobeRgb);

        let derived = model.derive(&target).unwrap();
        let ColorModel::Component(ccm) = &derived else {
            panic!("expected component model");
        };
        assert!(ccm.has_alpha());
        assert!(ccm.alpha_premultiplied());
        assert_eq!(ccm.transparency(), Transparency::Translucent);
        assert_eq!(ccm.transfer_type(), TransferType::U16);
        assert!(ColorSpace::same(ccm.color_space(), &target));
        assert!(model.same_layout(&derived));
    }

    #[test]
    fn test_component_force_no_alpha() {
        let model: ColorModel =
            ComponentModel::with_alpha(ColorSpace::srgb(), TransferType::U8).into();
        let derived = derive_color_model(&model, &ColorSpace::srgb(), true).unwrap();

        let ColorModel::Component(ccm) = derived else {
            panic!("expected component model");
        };
        assert!(!ccm.has_alpha());
        assert!(!ccm.alpha_premultiplied());
        assert_eq!(ccm.transparency(), Transparency::Opaque);
        assert_eq!(ccm.transfer_type(), TransferType::U8);
    }

    #[test]
    fn test_packed_recomputes_bit_count() {
        // Declared 32 bits, masks only cover 24
        let model: ColorModel = PackedModel::new(
            ColorSpace::srgb(),
            ChannelMasks::RGB888,
            32,
            false,
            TransferType::I32,
        )
        .unwrap()
        .into();

        let derived = model.derive(&ColorSpace::srgb()).unwrap();
        let ColorModel::Packed(pcm) = derived else {
            panic!("expected packed model");
        };
        assert_eq!(pcm.bits_per_pixel(), 24);
        assert_eq!(pcm.masks(), ChannelMasks::RGB888);
        assert_eq!(pcm.transfer_type(), TransferType::I32);
    }

    #[test]
    fn test_packed_ignores_force_no_alpha() {
        let model: ColorModel = PackedModel::from_masks(ColorSpace::srgb(), ChannelMasks::ARGB8888)
            .unwrap()
            .into();
        let derived = derive_color_model(&model, &ColorSpace::srgb(), true).unwrap();
        assert!(derived.has_alpha());
        assert!(model.same_layout(&derived));
    }

    #[test]
    fn test_indexed_is_rejected() {
        let model: ColorModel = IndexedModel::new(ColorSpace::srgb(), 8, 256).into();
        let err = model.derive(&ColorSpace::srgb()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLayout { kind: "indexed" }));
    }

    #[test]
    fn test_overlapping_masks_rejected() {
        let masks = ChannelMasks::new(0xFF00, 0x0FF0, 0x000F, 0);
        let result = PackedModel::from_masks(ColorSpace::srgb(), masks);
        assert!(matches!(result, Err(Error::OverlappingMasks(0x0F00))));
    }

    #[test]
    fn test_masks_wider_than_transfer_rejected() {
        let result = PackedModel::new(
            ColorSpace::srgb(),
            ChannelMasks::RGB888,
            24,
            false,
            TransferType::U16,
        );
        assert!(matches!(
            result,
            Err(Error::MasksExceedTransfer {
                masks: 0x00FF_FFFF,
                bits: 16
            })
        ));

        let fits = PackedModel::new(
            ColorSpace::srgb(),
            ChannelMasks::RGB888,
            24,
            false,
            TransferType::I32,
        );
        assert!(fits.is_ok());
    }

    #[test]
    fn test_split_mask_rejected() {
        let masks = ChannelMasks::new(0b0101, 0b0010, 0b1000, 0);
        assert_eq!(masks.non_contiguous(), Some(0b0101));
        let result = PackedModel::new(ColorSpace::srgb(), masks, 4, false, TransferType::U8);
        assert!(matches!(result, Err(Error::NonContiguousMask(0b0101))));

        assert_eq!(ChannelMasks::RGB565.non_contiguous(), None);
        assert_eq!(ChannelMasks::new(u32::MAX, 0, 0, 0).non_contiguous(), None);
    }

    #[test]
    fn test_from_masks_transfer_type() {
        let rgb565 = PackedModel::from_masks(ColorSpace::srgb(), ChannelMasks::RGB565).unwrap();
        assert_eq!(rgb565.transfer_type(), TransferType::U16);
        assert_eq!(rgb565.bits_per_pixel(), 16);

        let argb = PackedModel::from_masks(ColorSpace::srgb(), ChannelMasks::ARGB8888).unwrap();
        assert_eq!(argb.transfer_type(), TransferType::I32);
        assert_eq!(argb.bits_per_pixel(), 32);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_masks_serialize() {
        let json = serde_json::to_string(&ChannelMasks::RGB565).unwrap();
        assert_eq!(json, r#"{"red":63488,"green":2016,"blue":31,"alpha":0}"#);
    }

    #[test]
    fn test_bytes_per_pixel() {
        let rgba16: ColorModel =
            ComponentModel::with_alpha(ColorSpace::srgb(), TransferType::U16).into();
        assert_eq!(rgba16.bytes_per_pixel(), 8);

        let gray: ColorModel =
            ComponentModel::opaque(ColorSpace::named(NamedSpace::Gray), TransferType::U8).into();
        assert_eq!(gray.bytes_per_pixel(), 1);

        let packed: ColorModel = PackedModel::from_masks(ColorSpace::srgb(), ChannelMasks::RGB565)
            .unwrap()
            .into();
        assert_eq!(packed.bytes_per_pixel(), 2);
    }
}
