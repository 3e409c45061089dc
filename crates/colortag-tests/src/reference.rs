//! lcms2 reference wrappers
//!
//! lcms2 serves two purposes here: it produces real ICC blobs to feed
//! colortag's profile-backed spaces, and it computes the reference output
//! those conversions are compared against.

use anyhow::{Result, anyhow};
use lcms2::{CIExyY, CIExyYTRIPLE, Intent, PixelFormat, Profile, ToneCurve, Transform};

/// D50 white point used for generated profiles
const D50: CIExyY = CIExyY {
    x: 0.3457,
    y: 0.3585,
    Y: 1.0,
};

/// D65 white point
const D65: CIExyY = CIExyY {
    x: 0.3127,
    y: 0.3290,
    Y: 1.0,
};

/// lcms2's built-in sRGB, serialized as ICC
pub fn srgb_icc() -> Result<Vec<u8>> {
    Profile::new_srgb()
        .icc()
        .map_err(|e| anyhow!("lcms2 sRGB serialize: {}", e))
}

/// Gray profile with the given gamma, serialized as ICC
pub fn gray_icc(gamma: f64) -> Result<Vec<u8>> {
    let curve = ToneCurve::new(gamma);
    let profile =
        Profile::new_gray(&D50, &curve).map_err(|e| anyhow!("lcms2 gray profile: {}", e))?;
    profile
        .icc()
        .map_err(|e| anyhow!("lcms2 gray serialize: {}", e))
}

/// Matrix-shaper RGB profile with Adobe RGB (1998) primaries and gamma 2.2
pub fn adobe_rgb_icc() -> Result<Vec<u8>> {
    let primaries = CIExyYTRIPLE {
        Red: CIExyY {
            x: 0.64,
            y: 0.33,
            Y: 1.0,
        },
        Green: CIExyY {
            x: 0.21,
            y: 0.71,
            Y: 1.0,
        },
        Blue: CIExyY {
            x: 0.15,
            y: 0.06,
            Y: 1.0,
        },
    };
    let curve = ToneCurve::new(2.2);
    let profile = Profile::new_rgb(&D65, &primaries, &[&curve, &curve, &curve])
        .map_err(|e| anyhow!("lcms2 rgb profile: {}", e))?;
    profile
        .icc()
        .map_err(|e| anyhow!("lcms2 rgb serialize: {}", e))
}

/// Transform packed RGB8 pixels between two ICC profiles with lcms2
pub fn transform_lcms2(
    src_profile_data: &[u8],
    dst_profile_data: &[u8],
    src_pixels: &[u8],
) -> Result<Vec<u8>> {
    let src_profile =
        Profile::new_icc(src_profile_data).map_err(|e| anyhow!("lcms2 src profile: {}", e))?;
    let dst_profile =
        Profile::new_icc(dst_profile_data).map_err(|e| anyhow!("lcms2 dst profile: {}", e))?;

    let transform = Transform::new(
        &src_profile,
        PixelFormat::RGB_8,
        &dst_profile,
        PixelFormat::RGB_8,
        Intent::Perceptual,
    )
    .map_err(|e| anyhow!("lcms2 transform: {}", e))?;

    let mut dst_pixels = vec![0u8; src_pixels.len()];
    transform.transform_pixels(src_pixels, &mut dst_pixels);

    Ok(dst_pixels)
}
