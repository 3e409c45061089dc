//! Error types for colortag

use thiserror::Error;

use crate::transform::EngineError;

/// Result type for colortag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in colortag operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Byte range request outside the source, or overflowing 32-bit arithmetic
    #[error(
        "Could not read block (block start: {offset}, block length: {length}, data length: {size})"
    )]
    Range { offset: u64, length: i32, size: u64 },

    /// Color model variant the deriver cannot rebuild
    #[error("Could not clone unknown color model type: {kind}")]
    UnsupportedLayout { kind: &'static str },

    /// The color transform engine failed
    #[error("Transform error: {0}")]
    Transform(#[from] EngineError),

    /// An associated profile exists but could not be loaded
    #[error("Profile load error: {0}")]
    ProfileLoad(String),

    /// Replacement color model does not describe the buffer's samples
    #[error("Incompatible color model: expected {expected} bytes per pixel, got {actual}")]
    IncompatibleModel { expected: usize, actual: usize },

    /// Buffer size mismatch
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Zero or overflowing buffer dimensions
    #[error("Invalid buffer dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Packed channel masks share bits
    #[error("Overlapping channel masks: 0x{0:08X}")]
    OverlappingMasks(u32),

    /// A packed channel mask is not one run of adjacent bits
    #[error("Non-contiguous channel mask: 0x{0:08X}")]
    NonContiguousMask(u32),

    /// Packed channel masks reach past the transfer word
    #[error("Channel masks 0x{masks:08X} do not fit in a {bits}-bit transfer word")]
    MasksExceedTransfer { masks: u32, bits: u32 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
