//! Error types for unslide library.

use std::io;
use thiserror::Error;

/// Result type alias for unslide operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting a slide deck.
///
/// Every variant except the configuration ones aborts the whole document:
/// the pipeline has no partial-recovery path.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The page-description decoder could not produce a page.
    #[error("Failed to decode page {page}: {message}")]
    Decode {
        /// Page number (1-indexed)
        page: u32,
        /// Decoder message
        message: String,
    },

    /// The document could not be opened by the decoder.
    #[error("Failed to open document: {0}")]
    Open(String),

    /// An embedded image resource could not be extracted.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// A page or page region could not be rasterized.
    #[error("Rasterization error on page {page}: {message}")]
    Rasterize {
        /// Page number (1-indexed)
        page: u32,
        /// Renderer message
        message: String,
    },

    /// The OCR engine failed to run.
    #[error("OCR error ({mode}): {message}")]
    Ocr {
        /// OCR mode that was requested
        mode: String,
        /// Engine message
        message: String,
    },

    /// Bitmap could not be encoded or written as PNG.
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Error while rendering output (text stream, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a decode error for a page.
    pub fn decode(page: u32, message: impl Into<String>) -> Self {
        Error::Decode {
            page,
            message: message.into(),
        }
    }

    /// Create a rasterization error for a page.
    pub fn rasterize(page: u32, message: impl Into<String>) -> Self {
        Error::Rasterize {
            page,
            message: message.into(),
        }
    }

    /// Create an OCR error for a mode.
    pub fn ocr(mode: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Ocr {
            mode: mode.into(),
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::ImageEncode(err.to_string()),
        }
    }
}
