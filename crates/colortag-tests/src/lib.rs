//! # colortag-tests
//!
//! Scenario and parity testing for colortag.
//!
//! This crate provides:
//! - Fixture buffers in component and packed layouts
//! - A perceptual accuracy metric for comparing 8-bit RGB output
//! - lcms2 reference transforms and lcms2-serialized ICC profiles
//!
//! ## Test Categories
//!
//! 1. **Relabel**: layout preservation, storage sharing
//! 2. **Byte source**: randomized range checks, concurrent readers
//! 3. **Conversion**: moxcms engine through the relabel/convert pipeline
//! 4. **Parity**: colortag conversions against lcms2

pub mod accuracy;
pub mod fixtures;
pub mod reference;

pub use accuracy::{DeltaEStats, compare_rgb_buffers};
pub use fixtures::{TestPattern, generate_pattern};
