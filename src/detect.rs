//! Input validation and deck inspection.
//!
//! [`detect_format_from_path`] checks the `%PDF-x.y` header before any
//! decoder touches the file. [`check_flattening`] tells whether a deck still
//! carries individual pictures or was flattened into one image per slide,
//! in which case local extraction yields little and a layout-aware remote
//! service is the better choice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::backend::PageDecoder;
use crate::error::{Error, Result};

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Whether a linearization dictionary appears near the start
    pub linearized: bool,
}

impl fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF {}", self.version)?;
        if self.linearized {
            write!(f, " (linearized)")?;
        }
        Ok(())
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Bytes scanned for the linearization dictionary.
const HEADER_SCAN_LEN: usize = 1024;

/// Default page-area fraction at or above which an image counts as a
/// flattened slide rather than a picture.
pub const DEFAULT_FLATTEN_THRESHOLD: f32 = 0.9;

/// Detect the PDF header of a file.
///
/// ```no_run
/// use unslide::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("deck.pdf").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_SCAN_LEN);
    file.take(HEADER_SCAN_LEN as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the PDF header from the first bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if !data.starts_with(PDF_MAGIC) || data.len() < PDF_MAGIC.len() + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(version_bytes) {
        return Err(Error::UnsupportedVersion(version));
    }

    let scanned = &data[..data.len().min(HEADER_SCAN_LEN)];
    let linearized = scanned.windows(11).any(|w| w == b"/Linearized");

    Ok(PdfFormat {
        version,
        linearized,
    })
}

fn is_valid_version(version: &[u8]) -> bool {
    matches!(version, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit())
}

/// Check if a file starts with a valid PDF header.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Suggested extraction route for a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Local extraction will find the pictures
    Local,
    /// Slides are flattened; use a layout-aware remote service
    Cloud,
}

/// Outcome of [`check_flattening`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatteningReport {
    pub is_flattened: bool,
    pub has_true_images: bool,
    pub recommendation: Recommendation,
    pub reason: String,

    /// Page-area fraction used for the decision
    pub threshold: f32,

    /// Image blocks smaller than the threshold
    pub true_image_count: usize,

    /// Image blocks at or above the threshold
    pub full_page_image_count: usize,
}

/// Decide whether a deck carries real pictures.
///
/// An image block covering less than `threshold` of its page's area is a
/// true image. A deck with none is considered flattened. Pages with zero
/// area are ignored. Only page layout is read, so image pixels are never
/// decoded.
pub fn check_flattening<D: PageDecoder>(decoder: &D, threshold: f32) -> Result<FlatteningReport> {
    let mut true_images = 0;
    let mut full_page = 0;

    for index in 0..decoder.page_count() {
        let page = decoder.decode_layout(index)?;
        let page_area = page.area();
        if page_area <= 0.0 {
            continue;
        }
        for block in page.image_blocks() {
            let coverage = block.bbox().area() / page_area;
            if coverage < threshold {
                true_images += 1;
            } else {
                full_page += 1;
            }
        }
    }

    let has_true_images = true_images > 0;
    let (recommendation, reason) = if has_true_images {
        (
            Recommendation::Local,
            format!(
                "{} embedded image(s) smaller than {:.0}% of the page",
                true_images,
                threshold * 100.0
            ),
        )
    } else {
        (
            Recommendation::Cloud,
            format!(
                "no image smaller than {:.0}% of the page; slides appear flattened",
                threshold * 100.0
            ),
        )
    };
    log::debug!("Flattening check: {}", reason);

    Ok(FlatteningReport {
        is_flattened: !has_true_images,
        has_true_images,
        recommendation,
        reason,
        threshold,
        true_image_count: true_images,
        full_page_image_count: full_page,
    })
}
