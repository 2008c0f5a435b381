//! Error types for the cvbuilder library.

use std::io;
use thiserror::Error;

/// Result type alias for cvbuilder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while editing, rendering or exporting a résumé.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON text could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed JSON does not describe a valid document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The key-value store rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The export target element is not present in the visual tree.
    #[error("Element not found: #{0}")]
    RootNotFound(String),

    /// The rasterizer met a color syntax it cannot interpret.
    #[error("Attempting to parse an unsupported color function '{0}'")]
    UnsupportedColor(String),

    /// Error decoding or encoding raster images.
    #[error("Image error: {0}")]
    Image(String),

    /// Error assembling the PDF container.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The rasterizer failed to produce a bitmap.
    #[error("Capture error: {0}")]
    Capture(String),

    /// The host print pipeline raised.
    #[error("Print error: {0}")]
    Print(String),

    /// An asset could not be fetched.
    #[error("Failed to load asset {url}: {reason}")]
    Asset {
        /// Resolved asset URL
        url: String,
        /// Human-readable cause
        reason: String,
    },

    /// Another export currently owns the visual tree.
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::Image(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RootNotFound("cv-preview".to_string());
        assert_eq!(err.to_string(), "Element not found: #cv-preview");

        let err = Error::UnsupportedColor("oklch".to_string());
        assert_eq!(
            err.to_string(),
            "Attempting to parse an unsupported color function 'oklch'"
        );

        let err = Error::Asset {
            url: "/logo.png".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load asset /logo.png: not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
