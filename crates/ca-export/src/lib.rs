//! Glyph rasterization for chromascii.
//!
//! Turns an `AsciiGrid` back into pixels with a fixed monospace layout, using
//! either a TrueType/OpenType face or the built-in bitmap face.

pub mod builtin;
pub mod font;
pub mod rasterizer;

pub use font::{FontFace, FontSource, LoadedFont, acquire};
pub use rasterizer::{Rasterizer, Rendered, rasterize};
