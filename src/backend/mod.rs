//! Backend abstraction layer.
//!
//! The extraction pipeline talks to the PDF library and the OCR engine only
//! through the [`PageDecoder`] and [`OcrEngine`] traits, so concrete backends
//! can be swapped without touching the ordering and fallback logic.

#[cfg(feature = "pdfium")]
mod pdfium;
mod tesseract;

#[cfg(feature = "pdfium")]
pub use pdfium::{create_pdfium, PdfiumDecoder};
pub use tesseract::{parse_tsv, TesseractConfig, TesseractEngine};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::model::{Bitmap, BoundingBox, DecodedPage, ImageIdentity, OcrWord};

/// Abstract interface for page-description access.
///
/// Page indices are 0-based; page numbers reported in [`DecodedPage`] are
/// 1-based.
pub trait PageDecoder {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Decode one page into ordered blocks.
    fn decode_page(&self, index: usize) -> Result<DecodedPage>;

    /// Decode one page for its geometry only.
    ///
    /// Blocks keep their kinds and boxes, but image identities may be left
    /// out. Backends that pay to identify images should override this.
    fn decode_layout(&self, index: usize) -> Result<DecodedPage> {
        self.decode_page(index)
    }

    /// Extract an embedded image resource at its native resolution.
    fn extract_image(&self, identity: &ImageIdentity) -> Result<Bitmap>;

    /// Rasterize a page at `zoom` times its size in points.
    ///
    /// When `clip` is given, only that page-space rectangle is returned.
    fn render_page(&self, index: usize, zoom: f32, clip: Option<&BoundingBox>) -> Result<Bitmap>;
}

impl<D: PageDecoder + ?Sized> PageDecoder for &D {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn decode_page(&self, index: usize) -> Result<DecodedPage> {
        (**self).decode_page(index)
    }

    fn decode_layout(&self, index: usize) -> Result<DecodedPage> {
        (**self).decode_layout(index)
    }

    fn extract_image(&self, identity: &ImageIdentity) -> Result<Bitmap> {
        (**self).extract_image(identity)
    }

    fn render_page(&self, index: usize, zoom: f32, clip: Option<&BoundingBox>) -> Result<Bitmap> {
        (**self).render_page(index, zoom, clip)
    }
}

/// Page segmentation strategy requested from the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrMode {
    /// Assume a single uniform block of text
    SingleBlock,
    /// Find as much text as possible in no particular order
    SparseText,
}

impl OcrMode {
    /// Tesseract page segmentation mode number.
    pub fn psm(&self) -> u8 {
        match self {
            OcrMode::SingleBlock => 6,
            OcrMode::SparseText => 11,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrMode::SingleBlock => "single_block",
            OcrMode::SparseText => "sparse_text",
        }
    }
}

impl fmt::Display for OcrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (psm {})", self.as_str(), self.psm())
    }
}

/// Abstract interface for word-level OCR.
pub trait OcrEngine {
    /// Recognize words in an RGB bitmap.
    ///
    /// Every word the engine reports is returned, including low-confidence
    /// and empty ones; filtering is the caller's job.
    fn recognize(&self, image: &RgbImage, mode: OcrMode) -> Result<Vec<OcrWord>>;
}

impl<O: OcrEngine + ?Sized> OcrEngine for &O {
    fn recognize(&self, image: &RgbImage, mode: OcrMode) -> Result<Vec<OcrWord>> {
        (**self).recognize(image, mode)
    }
}
