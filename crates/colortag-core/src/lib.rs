//! # colortag - color space tagging for pixel buffers
//!
//! Relabel pixel buffers with the color space they are really in, convert them
//! between color spaces, and read raw encoded bytes through bounds-checked
//! ranges.
//!
//! ## Relabel vs. convert
//!
//! - **Relabel** swaps the color space a buffer is tagged with. Samples are not
//!   touched; the new buffer shares storage with the old one. Use it when a
//!   decoder assumed the wrong space.
//! - **Convert** computes new sample values in another space through a
//!   [`TransformEngine`], relabeling before and after so a wrong input tag or a
//!   sloppy engine tag cannot leak into the result.
//!
//! Both keep the buffer's bit layout: component layouts keep their alpha and
//! transfer type, packed layouts keep their channel masks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use colortag_core::{
//!     ColorSpace, ComponentModel, NamedSpace, PixelBuffer, SpaceConverter, TransferType,
//!     relabel_color_space,
//! };
//!
//! // Decoder assumed sRGB
//! let model = ComponentModel::opaque(ColorSpace::srgb(), TransferType::U8);
//! let buffer = PixelBuffer::new(1, 1, model.into(), vec![255, 128, 64]).unwrap();
//!
//! // The file says Adobe RGB: fix the tag
//! let adobe = ColorSpace::named(NamedSpace::AdobeRgb);
//! let tagged = relabel_color_space(&buffer, &adobe).unwrap();
//!
//! // Bring the pixels to the device space
//! let converter = SpaceConverter::new();
//! let srgb = converter.convert_to_device(&tagged).unwrap();
//! assert_eq!(srgb.samples().len(), 3);
//! ```

pub mod buffer;
pub mod byte_source;
pub mod color_model;
pub mod convert;
pub mod error;
pub mod profile;
pub mod relabel;
pub mod space;
pub mod transform;

pub use buffer::PixelBuffer;
pub use byte_source::{BoundedByteSource, ByteStream};
pub use color_model::{
    ChannelMasks, ColorModel, ComponentModel, IndexedModel, PackedModel, TransferType,
    Transparency, derive_color_model,
};
pub use convert::SpaceConverter;
pub use error::{Error, Result};
pub use profile::{ColorProfile, IccFile, ProfileSource};
pub use relabel::{relabel_color_space, relabel_icc_profile, relabel_with_model};
pub use space::{ColorSpace, NamedSpace, SpaceFamily, SpaceSource};
pub use transform::{
    EngineError, EngineOptions, MoxcmsEngine, QualityPolicy, RenderQuality, TransformEngine,
};

/// Version of colortag
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
