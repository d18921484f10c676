use thiserror::Error;

/// Errors raised by the conversion pipeline.
///
/// Every stage returns this type unchanged up to the caller, which is expected to
/// report it and abandon that single conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Bad resample target, zero-sized source, zero font size or an output
    /// buffer that cannot be addressed.
    #[error("Dimensions invalides : {0}")]
    InvalidDimension(String),

    /// The character ramp contains no glyph.
    #[error("Rampe de caractères vide")]
    EmptyRamp,

    /// Requested font unusable and no fallback allowed.
    #[error("Police inutilisable {path} : {reason}")]
    FontLoad {
        /// Path of the font that was requested.
        path: String,
        /// Underlying read or parse failure.
        reason: String,
    },

    /// The encoded source image could not be read or decoded.
    #[error("Impossible de décoder {path} : {reason}")]
    Decode {
        /// Path of the image file.
        path: String,
        /// Decoder message.
        reason: String,
    },

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidDimension`].
    #[must_use]
    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }
}

/// Result alias used across the workspace libraries.
pub type Result<T> = std::result::Result<T, CoreError>;
