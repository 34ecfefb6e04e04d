//! # unslide
//!
//! Slide deck content extraction for Rust.
//!
//! This library turns a PDF slide deck into a plain text stream with one
//! section per slide, where embedded pictures and vector drawings are
//! written out as PNG files and referenced by `[IMAGE_dddd.png]`
//! placeholders in reading order. Slides without a text layer go through
//! OCR.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "pdfium")]
//! fn main() -> unslide::Result<()> {
//!     use std::path::Path;
//!     use unslide::{extract_file, OutputLayout};
//!
//!     let layout = OutputLayout::timestamped(Path::new("lecture.pdf"));
//!     let extraction = extract_file("lecture.pdf", &layout)?;
//!     println!("{}", extraction.text());
//!     Ok(())
//! }
//! # #[cfg(not(feature = "pdfium"))]
//! # fn main() {}
//! ```
//!
//! ## Backends
//!
//! The pipeline only talks to [`PageDecoder`] and [`OcrEngine`]. The crate
//! ships [`TesseractEngine`] and, with the `pdfium` feature, a
//! PDFium-backed decoder.

pub mod backend;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod output;
pub mod render;

// Re-export commonly used types
pub use backend::{OcrEngine, OcrMode, PageDecoder, TesseractConfig, TesseractEngine};
pub use detect::{
    check_flattening, detect_format_from_bytes, detect_format_from_path, is_pdf, FlatteningReport,
    PdfFormat, Recommendation, DEFAULT_FLATTEN_THRESHOLD,
};
pub use error::{Error, Result};
pub use extract::{ExtractOptions, ImageAllocator, OcrPass, PageSelection, SlideExtractor, TieBreak};
pub use model::{
    Bitmap, BlockKind, BoundingBox, ContentBlock, ContentItem, DecodedPage, ImageIdentity,
    MaterializedImage, OcrLine, OcrWord, Slide,
};
pub use output::OutputLayout;
pub use render::{Extraction, ExtractionStats, JsonFormat, Summary};

#[cfg(feature = "pdfium")]
pub use backend::PdfiumDecoder;

#[cfg(feature = "pdfium")]
use std::path::Path;

/// Extract a PDF deck into an output layout with default settings.
///
/// Images go to the layout's images directory and the slide stream to its
/// text file.
#[cfg(feature = "pdfium")]
pub fn extract_file<P: AsRef<Path>>(path: P, layout: &OutputLayout) -> Result<Extraction> {
    extract_file_with_options(
        path,
        layout,
        ExtractOptions::default(),
        TesseractConfig::default(),
    )
}

/// Extract a PDF deck with custom extraction and OCR settings.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use unslide::{extract_file_with_options, ExtractOptions, OutputLayout, TesseractConfig};
///
/// let options = ExtractOptions::new().with_page_range(1..=5);
/// let ocr = TesseractConfig::new().with_language("deu");
/// let layout = OutputLayout::new("out");
/// let extraction = extract_file_with_options("deck.pdf", &layout, options, ocr)?;
/// println!("{} images", extraction.images.len());
/// # Ok::<(), unslide::Error>(())
/// ```
#[cfg(feature = "pdfium")]
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    layout: &OutputLayout,
    options: ExtractOptions,
    ocr: TesseractConfig,
) -> Result<Extraction> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;
    log::debug!("{}: {}", path.display(), format);

    let pdfium = backend::create_pdfium()?;
    let decoder = PdfiumDecoder::open(&pdfium, path)?;

    layout.prepare()?;
    let extractor = SlideExtractor::with_options(TesseractEngine::with_config(ocr), options);
    let extraction = extractor.extract(&decoder, &layout.images_dir())?;
    layout.write_text(&extraction.text())?;
    Ok(extraction)
}

/// Run the flattening check on a PDF file.
#[cfg(feature = "pdfium")]
pub fn check_file<P: AsRef<Path>>(path: P, threshold: f32) -> Result<FlatteningReport> {
    let path = path.as_ref();
    detect_format_from_path(path)?;
    let pdfium = backend::create_pdfium()?;
    let decoder = PdfiumDecoder::open(&pdfium, path)?;
    check_flattening(&decoder, threshold)
}
