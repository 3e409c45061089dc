//! Test fixtures
//!
//! Sample patterns and ready-made pixel buffers in the layouts decoders
//! commonly produce.

use colortag_core::{
    ChannelMasks, ColorSpace, ComponentModel, PackedModel, PixelBuffer, TransferType,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Test pattern types
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// Horizontal gradient black to white
    GradientH,
    /// RGB color cube corners (8 colors)
    ColorCube,
    /// Saturated primaries and secondaries
    Saturated,
    /// Random pixels with seed
    Random(u64),
}

/// Generate a pattern as packed RGB8 bytes
pub fn generate_pattern(pattern: TestPattern, width: usize, height: usize) -> Vec<u8> {
    let mut data = vec![0u8; width * height * 3];

    match pattern {
        TestPattern::GradientH => {
            for (i, chunk) in data.chunks_exact_mut(3).enumerate() {
                let x = i % width;
                let v = (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8;
                chunk.fill(v);
            }
        }
        TestPattern::ColorCube => {
            for (i, chunk) in data.chunks_exact_mut(3).enumerate() {
                let corner = i % 8;
                chunk[0] = if corner & 1 != 0 { 255 } else { 0 };
                chunk[1] = if corner & 2 != 0 { 255 } else { 0 };
                chunk[2] = if corner & 4 != 0 { 255 } else { 0 };
            }
        }
        TestPattern::Saturated => {
            let colors: [[u8; 3]; 6] = [
                [255, 0, 0],
                [0, 255, 0],
                [0, 0, 255],
                [255, 255, 0],
                [255, 0, 255],
                [0, 255, 255],
            ];
            for (i, chunk) in data.chunks_exact_mut(3).enumerate() {
                chunk.copy_from_slice(&colors[i % colors.len()]);
            }
        }
        TestPattern::Random(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.fill_bytes(&mut data);
        }
    }

    data
}

/// Opaque RGB8 buffer tagged `space`
pub fn rgb8_buffer(
    space: &ColorSpace,
    pattern: TestPattern,
    width: u32,
    height: u32,
) -> PixelBuffer {
    let data = generate_pattern(pattern, width as usize, height as usize);
    let model = ComponentModel::opaque(space.clone(), TransferType::U8);
    PixelBuffer::new(width, height, model.into(), data).expect("fixture dimensions")
}

/// Opaque RGB16 buffer tagged `space`, 8-bit pattern widened to 16 bits
pub fn rgb16_buffer(
    space: &ColorSpace,
    pattern: TestPattern,
    width: u32,
    height: u32,
) -> PixelBuffer {
    let wide: Vec<u16> = generate_pattern(pattern, width as usize, height as usize)
        .into_iter()
        .map(|v| u16::from(v) * 257)
        .collect();
    let model = ComponentModel::opaque(space.clone(), TransferType::U16);
    PixelBuffer::new(width, height, model.into(), bytemuck::cast_slice(&wide).to_vec())
        .expect("fixture dimensions")
}

/// 5-6-5 packed buffer tagged `space`
pub fn rgb565_buffer(
    space: &ColorSpace,
    pattern: TestPattern,
    width: u32,
    height: u32,
) -> PixelBuffer {
    let words: Vec<u16> = generate_pattern(pattern, width as usize, height as usize)
        .chunks_exact(3)
        .map(|p| {
            (u16::from(p[0] >> 3) << 11) | (u16::from(p[1] >> 2) << 5) | u16::from(p[2] >> 3)
        })
        .collect();
    let model = PackedModel::from_masks(space.clone(), ChannelMasks::RGB565).expect("masks");
    PixelBuffer::new(width, height, model.into(), bytemuck::cast_slice(&words).to_vec())
        .expect("fixture dimensions")
}

/// Random `(offset, length)` requests that fit inside `size` bytes
pub fn valid_ranges(seed: u64, size: usize, count: usize) -> Vec<(u64, i32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let offset = rng.gen_range(0..=size);
            let length = rng.gen_range(0..=size - offset);
            (offset as u64, length as i32)
        })
        .collect()
}
