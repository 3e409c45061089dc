//! Color space identities
//!
//! A [`ColorSpace`] is an opaque handle naming the space pixel samples are
//! expressed in: either one of the built-in [`NamedSpace`]s or an ICC profile
//! blob. Handles are compared by identity, never by value. Cloning a handle
//! yields the same identity; building two handles from equal bytes yields two
//! distinct identities.

use std::fmt;
use std::sync::Arc;

use crate::byte_source::BoundedByteSource;

/// Offset of the data color space signature in an ICC header
const ICC_COLOR_SPACE_OFFSET: u64 = 16;

/// Built-in color spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum NamedSpace {
    /// IEC 61966-2-1 sRGB, the standard device space
    Srgb,
    /// sRGB primaries with a linear transfer
    LinearSrgb,
    /// Display P3
    DisplayP3,
    /// Adobe RGB (1998)
    AdobeRgb,
    /// ITU-R BT.2020
    Bt2020,
    /// ProPhoto RGB
    ProPhotoRgb,
    /// Grayscale, gamma 2.2
    Gray,
    /// Grayscale, gamma 1.0
    LinearGray,
}

impl NamedSpace {
    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::LinearSrgb => "linear sRGB",
            Self::DisplayP3 => "Display P3",
            Self::AdobeRgb => "Adobe RGB (1998)",
            Self::Bt2020 => "BT.2020",
            Self::ProPhotoRgb => "ProPhoto RGB",
            Self::Gray => "Gray 2.2",
            Self::LinearGray => "linear Gray",
        }
    }

    /// Channel family of this space
    pub fn family(&self) -> SpaceFamily {
        match self {
            Self::Gray | Self::LinearGray => SpaceFamily::Gray,
            _ => SpaceFamily::Rgb,
        }
    }
}

/// Channel family of a color space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpaceFamily {
    /// Three color channels
    Rgb,
    /// One luminance channel
    Gray,
    /// Four ink channels
    Cmyk,
    /// Anything else (Lab, XYZ, multi-ink, unreadable header)
    Other,
}

impl SpaceFamily {
    /// Number of color channels, alpha excluded
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Other => 3,
            Self::Cmyk => 4,
        }
    }

    /// Map an ICC data color space signature
    fn from_icc_signature(sig: &[u8]) -> Self {
        match sig {
            b"RGB " => Self::Rgb,
            b"GRAY" => Self::Gray,
            b"CMYK" => Self::Cmyk,
            _ => Self::Other,
        }
    }
}

/// Where a color space comes from
#[derive(Debug)]
pub enum SpaceSource {
    /// A built-in space
    Named(NamedSpace),
    /// An ICC profile, kept as the raw blob
    Icc(Arc<[u8]>),
}

#[derive(Debug)]
struct SpaceInner {
    source: SpaceSource,
    family: SpaceFamily,
}

/// Identity of the color space a buffer's samples are expressed in
#[derive(Clone)]
pub struct ColorSpace {
    inner: Arc<SpaceInner>,
}

impl ColorSpace {
    /// Create a new identity for a built-in space
    pub fn named(space: NamedSpace) -> Self {
        Self {
            inner: Arc::new(SpaceInner {
                source: SpaceSource::Named(space),
                family: space.family(),
            }),
        }
    }

    /// Wrap an ICC profile blob
    ///
    /// The profile is not validated. Only the data color space signature in the
    /// header is peeked to learn the channel family; a profile whose header
    /// cannot be read reports [`SpaceFamily::Other`].
    pub fn from_icc(profile: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = profile.into();
        let family = BoundedByteSource::new(Arc::clone(&bytes))
            .read_range(ICC_COLOR_SPACE_OFFSET, 4)
            .map(|sig| SpaceFamily::from_icc_signature(&sig))
            .unwrap_or(SpaceFamily::Other);

        Self {
            inner: Arc::new(SpaceInner {
                source: SpaceSource::Icc(bytes),
                family,
            }),
        }
    }

    /// A new sRGB identity
    pub fn srgb() -> Self {
        Self::named(NamedSpace::Srgb)
    }

    /// The standard device space conversions fall back to (sRGB)
    pub fn device() -> Self {
        Self::srgb()
    }

    /// Source of this space
    pub fn source(&self) -> &SpaceSource {
        &self.inner.source
    }

    /// Built-in space, if this is one
    pub fn as_named(&self) -> Option<NamedSpace> {
        match self.inner.source {
            SpaceSource::Named(space) => Some(space),
            SpaceSource::Icc(_) => None,
        }
    }

    /// Raw ICC blob, if this space is profile-backed
    pub fn icc_bytes(&self) -> Option<&[u8]> {
        match &self.inner.source {
            SpaceSource::Icc(bytes) => Some(&bytes[..]),
            SpaceSource::Named(_) => None,
        }
    }

    /// Channel family
    pub fn family(&self) -> SpaceFamily {
        self.inner.family
    }

    /// Number of color channels, alpha excluded
    pub fn channels(&self) -> usize {
        self.inner.family.channels()
    }

    /// Whether `a` and `b` are the same identity
    pub fn same(a: &ColorSpace, b: &ColorSpace) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl From<NamedSpace> for ColorSpace {
    fn from(space: NamedSpace) -> Self {
        Self::named(space)
    }
}

impl fmt::Debug for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.source {
            SpaceSource::Named(space) => write!(f, "ColorSpace({})", space.name()),
            SpaceSource::Icc(bytes) => write!(
                f,
                "ColorSpace(ICC {:?}, {} bytes)",
                self.inner.family,
                bytes.len()
            ),
        }
    }
}
