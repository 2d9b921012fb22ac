//! Watermark error types.
//!
//! Defines errors that can occur during watermark processing. Only decode and
//! write failures ever reach a caller; font problems are absorbed by the font
//! resolver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a watermark operation.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// Uploaded bytes are not a supported or intact raster image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// The watermarked image could not be encoded or written
    #[error("Failed to write watermarked image to {}: {message}", path.display())]
    WriteError { path: PathBuf, message: String },
}

impl WatermarkError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError(message.into())
    }

    pub fn write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WriteError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - DecodeError → 400 (the client sent something that is not an image)
    /// - WriteError → 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            Self::DecodeError(_) => 400,
            Self::WriteError { .. } => 500,
        }
    }
}

/// Errors raised while loading a named TrueType font.
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Failed to read font file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid font file {}: {message}", path.display())]
    InvalidFont { path: PathBuf, message: String },
}
