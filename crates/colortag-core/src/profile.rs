//! ICC profiles
//!
//! [`ColorProfile`] is the engine-side form of a [`ColorSpace`]: a parsed
//! `moxcms::ColorProfile`. [`ProfileSource`] is how callers hand over the
//! profile that belongs to an image, if there is one.

use std::path::{Path, PathBuf};

use crate::space::{ColorSpace, NamedSpace, SpaceSource};
use crate::transform::EngineError;
use crate::{Error, Result};

/// Parsed ICC color profile
///
/// Thin wrapper around `moxcms::ColorProfile`.
#[derive(Debug, Clone)]
pub struct ColorProfile {
    inner: moxcms::ColorProfile,
}

impl ColorProfile {
    /// Parse a profile from raw ICC data
    pub fn from_bytes(data: &[u8]) -> std::result::Result<Self, EngineError> {
        let inner = moxcms::ColorProfile::new_from_slice(data)
            .map_err(|e| EngineError::Profile(format!("{:?}", e)))?;
        Ok(Self { inner })
    }

    /// Profile for a built-in space
    pub fn named(space: NamedSpace) -> Self {
        let inner = match space {
            NamedSpace::Srgb => moxcms::ColorProfile::new_srgb(),
            NamedSpace::LinearSrgb => {
                let mut profile = moxcms::ColorProfile::new_srgb();
                let linear = moxcms::curve_from_gamma(1.0);
                profile.red_trc = Some(linear.clone());
                profile.green_trc = Some(linear.clone());
                profile.blue_trc = Some(linear);
                profile
            }
            NamedSpace::DisplayP3 => moxcms::ColorProfile::new_display_p3(),
            NamedSpace::AdobeRgb => moxcms::ColorProfile::new_adobe_rgb(),
            NamedSpace::Bt2020 => moxcms::ColorProfile::new_bt2020(),
            NamedSpace::ProPhotoRgb => moxcms::ColorProfile::new_pro_photo_rgb(),
            NamedSpace::Gray => moxcms::ColorProfile::new_gray_with_gamma(2.2),
            NamedSpace::LinearGray => moxcms::ColorProfile::new_gray_with_gamma(1.0),
        };
        Self { inner }
    }

    /// Materialize the profile a color space stands for
    pub fn for_space(space: &ColorSpace) -> std::result::Result<Self, EngineError> {
        match space.source() {
            SpaceSource::Named(named) => Ok(Self::named(*named)),
            SpaceSource::Icc(bytes) => Self::from_bytes(bytes),
        }
    }

    /// Check if this is a matrix-shaper profile
    pub fn is_matrix_shaper(&self) -> bool {
        self.inner.is_matrix_shaper()
    }

    /// Access the inner moxcms profile
    pub fn inner(&self) -> &moxcms::ColorProfile {
        &self.inner
    }
}

/// Supplies the ICC profile associated with an image
pub trait ProfileSource {
    /// The profile bytes, `None` when the image has no profile
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProfileLoad`] when a profile exists but cannot be read.
    fn load_associated_profile(&self) -> Result<Option<Vec<u8>>>;
}

impl ProfileSource for Option<Vec<u8>> {
    fn load_associated_profile(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.clone())
    }
}

/// Profile stored in a standalone `.icc` file next to an image
#[derive(Debug, Clone)]
pub struct IccFile {
    path: PathBuf,
}

impl IccFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileSource for IccFile {
    fn load_associated_profile(&self) -> Result<Option<Vec<u8>>> {
        std::fs::read(&self.path)
            .map(Some)
            .map_err(|e| Error::ProfileLoad(format!("{}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_profiles_are_matrix_shaper() {
        for space in [
            NamedSpace::Srgb,
            NamedSpace::LinearSrgb,
            NamedSpace::DisplayP3,
            NamedSpace::AdobeRgb,
            NamedSpace::Bt2020,
            NamedSpace::ProPhotoRgb,
        ] {
            assert!(ColorProfile::named(space).is_matrix_shaper(), "{:?}", space);
        }
    }

    #[test]
    fn test_reject_small_profile() {
        let small_data = [0u8; 64];
        assert!(matches!(
            ColorProfile::from_bytes(&small_data),
            Err(EngineError::Profile(_))
        ));
    }

    #[test]
    fn test_in_memory_source() {
        let none: Option<Vec<u8>> = None;
        assert!(none.load_associated_profile().unwrap().is_none());
        let some = Some(vec![1u8, 2, 3]);
        assert_eq!(some.load_associated_profile().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_missing_icc_file() {
        let source = IccFile::new("/nonexistent/colortag/profile.icc");
        assert!(matches!(
            source.load_associated_profile(),
            Err(Error::ProfileLoad(_))
        ));
    }
}
