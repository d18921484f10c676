//! Shared types, ramp handling and configuration for chromascii.
//!
//! Every other crate of the workspace builds on the data model defined here:
//! `SourceImage` in, `AsciiGrid` in the middle, `RenderedImage` out.

pub mod charset;
pub mod config;
pub mod error;
pub mod frame;

pub use charset::{CharacterRamp, LuminanceLut};
pub use config::{ConvertConfig, FontSpec};
pub use error::{CoreError, Result};
pub use frame::{AsciiCell, AsciiGrid, GlyphMetrics, RenderedImage, Rgb, SourceImage};
