//! [`PageDecoder`] backed by the PDFium library.
//!
//! Page objects are mapped to blocks in content-stream order. Consecutive
//! text objects become one text block, split into lines wherever the
//! baseline moves. Image objects carry the SHA-256 of their decoded pixels
//! as identity, so a picture reused across slides maps to one output file.
//! Layout-only decoding skips the hashing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use sha2::{Digest, Sha256};

use super::PageDecoder;
use crate::error::{Error, Result};
use crate::model::{Bitmap, BoundingBox, DecodedPage, ImageIdentity, RawBlock, RawLine, RawSpan};

/// Block type codes for non-text, non-image objects.
const BLOCK_TYPE_PATH: u32 = 2;
const BLOCK_TYPE_SHADING: u32 = 3;
const BLOCK_TYPE_FORM: u32 = 4;
const BLOCK_TYPE_UNSUPPORTED: u32 = 5;

/// Fraction of the glyph height two objects' baselines may differ by and
/// still share a line.
const BASELINE_TOLERANCE: f32 = 0.5;

/// Horizontal gap, as a fraction of glyph height, treated as a word break.
const WORD_GAP: f32 = 0.15;

/// Bind to a PDFium shared library.
///
/// Looks in the current directory first, then in the system library paths.
pub fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Open(format!("failed to load PDFium library: {:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Where an identified image lives, for re-extraction.
#[derive(Debug, Clone, Copy)]
struct ImageLocation {
    page: u16,
    object: usize,
}

/// Decoder over one open PDF document.
pub struct PdfiumDecoder<'a> {
    document: PdfDocument<'a>,
    images: RefCell<HashMap<ImageIdentity, ImageLocation>>,
}

impl<'a> PdfiumDecoder<'a> {
    /// Open a PDF file.
    pub fn open(pdfium: &'a Pdfium, path: impl AsRef<Path>) -> Result<Self> {
        let document = pdfium
            .load_pdf_from_file(path.as_ref(), None)
            .map_err(|e| Error::Open(format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(Self::from_document(document))
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(pdfium: &'a Pdfium, data: &'a [u8]) -> Result<Self> {
        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| Error::Open(e.to_string()))?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: PdfDocument<'a>) -> Self {
        Self {
            document,
            images: RefCell::new(HashMap::new()),
        }
    }

    /// Map page objects to blocks, hashing image pixels only when
    /// `identify_images` is set.
    fn decode(&self, index: usize, identify_images: bool) -> Result<DecodedPage> {
        let page = self.page(index)?;
        let number = index as u32 + 1;
        let height = page.height().value;
        let mut decoded = DecodedPage::new(number, page.width().value, height);
        let mut run = TextRun::default();

        for (object_index, object) in page.objects().iter().enumerate() {
            let bbox = match object.bounds() {
                Ok(quad) => to_top_left(&quad.to_rect(), height),
                Err(e) => {
                    log::debug!("Page {}: skipping object without bounds: {}", number, e);
                    continue;
                }
            };

            if let PdfPageObject::Text(text) = &object {
                run.push(bbox, text.text());
                continue;
            }
            run.flush_into(&mut decoded);

            let block = match &object {
                PdfPageObject::Image(_) if !identify_images => RawBlock::Image {
                    bbox,
                    identity: None,
                },
                PdfPageObject::Image(image) => {
                    let pixels = image
                        .get_raw_image()
                        .map_err(|e| Error::decode(number, format!("image object: {}", e)))?;
                    let identity = content_identity(&pixels);
                    self.images.borrow_mut().insert(
                        identity.clone(),
                        ImageLocation {
                            page: index as u16,
                            object: object_index,
                        },
                    );
                    RawBlock::Image {
                        bbox,
                        identity: Some(identity),
                    }
                }
                PdfPageObject::Path(_) => RawBlock::other(bbox, BLOCK_TYPE_PATH),
                PdfPageObject::Shading(_) => RawBlock::other(bbox, BLOCK_TYPE_SHADING),
                PdfPageObject::XObjectForm(_) => RawBlock::other(bbox, BLOCK_TYPE_FORM),
                _ => RawBlock::other(bbox, BLOCK_TYPE_UNSUPPORTED),
            };
            decoded.add_block(block);
        }
        run.flush_into(&mut decoded);

        log::debug!(
            "Decoded page {}: {} blocks ({}x{} pt)",
            number,
            decoded.blocks.len(),
            decoded.width,
            decoded.height
        );
        Ok(decoded)
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>> {
        let count = self.page_count();
        if index >= count {
            return Err(Error::PageOutOfRange(index as u32 + 1, count as u32));
        }
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| Error::decode(index as u32 + 1, e.to_string()))
    }
}

impl PageDecoder for PdfiumDecoder<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn decode_page(&self, index: usize) -> Result<DecodedPage> {
        self.decode(index, true)
    }

    fn decode_layout(&self, index: usize) -> Result<DecodedPage> {
        self.decode(index, false)
    }

    fn extract_image(&self, identity: &ImageIdentity) -> Result<Bitmap> {
        let location = self
            .images
            .borrow()
            .get(identity)
            .copied()
            .ok_or_else(|| Error::ImageExtract(format!("unknown image {}", identity)))?;

        let page = self.page(location.page as usize)?;
        let object = page
            .objects()
            .get(location.object)
            .map_err(|e| Error::ImageExtract(e.to_string()))?;

        match &object {
            PdfPageObject::Image(image) => image
                .get_raw_image()
                .map(Bitmap::from)
                .map_err(|e| Error::ImageExtract(e.to_string())),
            _ => Err(Error::ImageExtract(format!(
                "object {} on page {} is not an image",
                location.object,
                location.page as u32 + 1
            ))),
        }
    }

    fn render_page(&self, index: usize, zoom: f32, clip: Option<&BoundingBox>) -> Result<Bitmap> {
        let page = self.page(index)?;
        let number = index as u32 + 1;

        let config = PdfRenderConfig::new().scale_page_by_factor(zoom);
        let full: DynamicImage = page
            .render_with_config(&config)
            .map_err(|e| Error::rasterize(number, e.to_string()))?
            .as_image();

        let region = match clip {
            Some(bbox) => bbox,
            None => return Ok(Bitmap::from(full)),
        };

        let (x, y, w, h) = pixel_region(region, zoom, full.width(), full.height());
        log::debug!(
            "Cropping page {} render {}x{} to ({}, {}) {}x{}",
            number,
            full.width(),
            full.height(),
            x,
            y,
            w,
            h
        );
        Ok(Bitmap::from(full.crop_imm(x, y, w, h)))
    }
}

/// Consecutive text objects awaiting conversion into one block.
#[derive(Default)]
struct TextRun {
    bbox: Option<BoundingBox>,
    lines: Vec<RawLine>,
}

impl TextRun {
    fn push(&mut self, bbox: BoundingBox, text: String) {
        self.bbox = Some(match self.bbox {
            Some(b) => b.union(&bbox),
            None => bbox,
        });

        if let Some(line) = self.lines.last_mut() {
            if let Some(line_box) = line.bbox {
                let glyph = bbox.height().max(1.0);
                if (line_box.y1 - bbox.y1).abs() <= glyph * BASELINE_TOLERANCE {
                    if bbox.x0 - line_box.x1 > glyph * WORD_GAP {
                        line.spans.push(RawSpan::new(" "));
                    }
                    line.spans.push(RawSpan::new(text));
                    line.bbox = Some(line_box.union(&bbox));
                    return;
                }
            }
        }

        self.lines.push(RawLine::single(bbox, text));
    }

    fn flush_into(&mut self, page: &mut DecodedPage) {
        if let Some(bbox) = self.bbox.take() {
            page.add_block(RawBlock::text(bbox, std::mem::take(&mut self.lines)));
        }
    }
}

/// Convert a PDF rectangle (bottom-left origin) to page space (top-left).
fn to_top_left(rect: &PdfRect, page_height: f32) -> BoundingBox {
    BoundingBox::new(
        rect.left().value,
        page_height - rect.top().value,
        rect.right().value,
        page_height - rect.bottom().value,
    )
}

/// Pixel rectangle covering `region` in a render at `zoom`, clamped to the
/// rendered size. Always at least one pixel in each dimension.
fn pixel_region(region: &BoundingBox, zoom: f32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let scaled = region.scale(zoom);
    let x = (scaled.x0.max(0.0).floor() as u32).min(width.saturating_sub(1));
    let y = (scaled.y0.max(0.0).floor() as u32).min(height.saturating_sub(1));
    let w = (scaled.width().ceil() as u32).min(width - x).max(1);
    let h = (scaled.height().ceil() as u32).min(height - y).max(1);
    (x, y, w, h)
}

/// Identity derived from decoded pixel content.
fn content_identity(image: &DynamicImage) -> ImageIdentity {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(image.as_bytes());
    ImageIdentity::new(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_region_clamped() {
        let region = BoundingBox::new(100.0, 50.0, 1000.0, 600.0);
        let (x, y, w, h) = pixel_region(&region, 2.0, 1920, 1080);
        assert_eq!((x, y), (200, 100));
        assert_eq!((w, h), (1720, 980));
    }

    #[test]
    fn test_pixel_region_degenerate() {
        let region = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
        let (_, _, w, h) = pixel_region(&region, 2.0, 100, 100);
        assert_eq!((w, h), (1, 1));
    }

    #[test]
    fn test_content_identity_stable() {
        let a = DynamicImage::new_rgb8(4, 4);
        let b = DynamicImage::new_rgb8(4, 4);
        let c = DynamicImage::new_rgb8(4, 5);
        assert_eq!(content_identity(&a), content_identity(&b));
        assert_ne!(content_identity(&a), content_identity(&c));
        assert_eq!(content_identity(&a).as_str().len(), 64);
    }

    #[test]
    fn test_text_run_joins_baseline() {
        let mut run = TextRun::default();
        run.push(BoundingBox::new(10.0, 10.0, 50.0, 22.0), "Hello".into());
        run.push(BoundingBox::new(55.0, 10.0, 90.0, 22.0), "world".into());
        run.push(BoundingBox::new(10.0, 40.0, 60.0, 52.0), "Next".into());

        let mut page = DecodedPage::widescreen(1);
        run.flush_into(&mut page);
        assert_eq!(page.blocks.len(), 1);
        match &page.blocks[0] {
            RawBlock::Text { lines, bbox } => {
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[0].raw_text(), "Hello world");
                assert_eq!(lines[1].raw_text(), "Next");
                assert_eq!(*bbox, BoundingBox::new(10.0, 10.0, 90.0, 52.0));
            }
            other => panic!("expected text block, got {:?}", other),
        }

        // Flushing twice does not emit an empty block
        run.flush_into(&mut page);
        assert_eq!(page.blocks.len(), 1);
    }
}
