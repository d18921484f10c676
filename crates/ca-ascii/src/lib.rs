//! Quantification luminance → glyphe pour chromascii.
//!
//! Maps each pixel of a resampled image to one ramp character, keeping its color.
pub mod luminance;
