//! Image input for chromascii: decoding, resampling and folder scanning.

pub mod folder;
pub mod image;
pub mod resize;

pub use resize::{fit_within, resample};
