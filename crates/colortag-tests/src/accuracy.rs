//! Accuracy measurement for 8-bit RGB output
//!
//! Buffers are compared in CIELAB (D65) with the CIE76 distance. A deltaE
//! below 1.0 is not perceptible; parity tests use that as their bar.

/// Statistics from a deltaE comparison
#[derive(Debug, Clone)]
pub struct DeltaEStats {
    /// Mean deltaE across all pixels
    pub mean: f64,
    /// Maximum deltaE
    pub max: f64,
    /// Largest absolute difference of any single channel
    pub max_channel_diff: u8,
    /// Number of pixels
    pub count: usize,
}

impl DeltaEStats {
    /// All differences imperceptible (deltaE < 1.0)
    pub fn is_excellent(&self) -> bool {
        self.max < 1.0
    }

    /// Differences barely perceptible (deltaE < 2.0)
    pub fn is_good(&self) -> bool {
        self.max < 2.0
    }
}

fn srgb_to_linear(value: u8) -> f64 {
    let v = f64::from(value) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// CIELAB coordinates of an 8-bit sRGB pixel
pub fn srgb_to_lab(rgb: [u8; 3]) -> [f64; 3] {
    let [r, g, b] = rgb.map(srgb_to_linear);
    let x = (r * 0.4124564 + g * 0.3575761 + b * 0.1804375) / 0.95047;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = (r * 0.0193339 + g * 0.1191920 + b * 0.9503041) / 1.08883;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// CIE76 distance between two Lab colors
pub fn delta_e_76(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| (p - q) * (p - q))
        .sum::<f64>()
        .sqrt()
}

/// Compare two packed RGB8 buffers pixel by pixel
///
/// # Panics
///
/// Panics when the buffers differ in length or are not whole pixels.
pub fn compare_rgb_buffers(reference: &[u8], result: &[u8]) -> DeltaEStats {
    assert_eq!(reference.len(), result.len());
    assert_eq!(reference.len() % 3, 0);

    let mut sum = 0.0;
    let mut max = 0.0f64;
    let mut max_channel_diff = 0u8;

    for (a, b) in reference.chunks_exact(3).zip(result.chunks_exact(3)) {
        let de = delta_e_76(srgb_to_lab([a[0], a[1], a[2]]), srgb_to_lab([b[0], b[1], b[2]]));
        sum += de;
        max = max.max(de);
        for (p, q) in a.iter().zip(b) {
            max_channel_diff = max_channel_diff.max(p.abs_diff(*q));
        }
    }

    let count = reference.len() / 3;
    DeltaEStats {
        mean: if count == 0 { 0.0 } else { sum / count as f64 },
        max,
        max_channel_diff,
        count,
    }
}
