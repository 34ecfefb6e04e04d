//! Slide extraction pipeline.
//!
//! Every selected page goes through the same steps:
//!
//! 1. [`classify`] splits the decoded page into text, image and other blocks.
//! 2. Non-text blocks are written as PNG files by a [`Materializer`], which
//!    reuses the file of an embedded image already seen in this document.
//! 3. Pages without native text are rendered and passed through OCR, with a
//!    sparse-text retry when the first pass finds nothing.
//! 4. Text lines, OCR lines and image placeholders are [`merge`]d into
//!    reading order.

mod classify;
mod materialize;
mod merge;
mod ocr;
mod options;

pub use classify::classify;
pub use materialize::{image_file_name, ImageAllocator, Materialized, Materializer};
pub use merge::{merge, ocr_items};
pub use ocr::{group_words, recognize_lines, OcrOutcome};
pub use options::{ExtractOptions, OcrPass, PageSelection, TieBreak};

use std::fs;
use std::path::Path;

use crate::backend::{OcrEngine, PageDecoder};
use crate::error::Result;
use crate::model::{ContentBlock, ContentItem, OcrReport, Slide};
use crate::render::{Extraction, ExtractionStats};

/// Extracts slide content from documents.
///
/// The extractor holds only configuration and the OCR engine. Image
/// numbering and the identity memo live in a fresh [`ImageAllocator`] for
/// each [`extract`](Self::extract) call.
pub struct SlideExtractor<O: OcrEngine> {
    ocr: O,
    options: ExtractOptions,
}

impl<O: OcrEngine> SlideExtractor<O> {
    /// Create an extractor with default options.
    pub fn new(ocr: O) -> Self {
        Self::with_options(ocr, ExtractOptions::default())
    }

    /// Create an extractor with custom options.
    pub fn with_options(ocr: O, options: ExtractOptions) -> Self {
        Self { ocr, options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn ocr(&self) -> &O {
        &self.ocr
    }

    /// Extract every selected page, writing images into `images_dir`.
    pub fn extract<D: PageDecoder>(&self, decoder: &D, images_dir: &Path) -> Result<Extraction> {
        self.extract_with_progress(decoder, images_dir, |_, _| {})
    }

    /// Like [`extract`](Self::extract), calling `progress(done, total)`
    /// after each page.
    pub fn extract_with_progress<D, F>(
        &self,
        decoder: &D,
        images_dir: &Path,
        mut progress: F,
    ) -> Result<Extraction>
    where
        D: PageDecoder,
        F: FnMut(usize, usize),
    {
        self.options.validate()?;

        let page_count = decoder.page_count();
        self.options.page_selection.check_bounds(page_count as u32)?;
        fs::create_dir_all(images_dir)?;

        let selected: Vec<usize> = (0..page_count)
            .filter(|i| self.options.page_selection.includes(*i as u32 + 1))
            .collect();
        log::debug!(
            "Extracting {} of {} pages into {}",
            selected.len(),
            page_count,
            images_dir.display()
        );

        let materializer = Materializer::new(decoder, images_dir, self.options.crop_zoom);
        let mut allocator = ImageAllocator::new();
        let mut extraction = Extraction::new(images_dir);

        for (done, &index) in selected.iter().enumerate() {
            let slide = self.extract_page(
                decoder,
                index,
                &materializer,
                &mut allocator,
                &mut extraction,
            )?;
            extraction.slides.push(slide);
            progress(done + 1, selected.len());
        }

        let stats = &extraction.stats;
        log::info!(
            "Extracted {} slides: {} text lines, {} OCR lines on {} pages, {} images ({} reused)",
            stats.page_count,
            stats.text_line_count,
            stats.ocr_line_count,
            stats.ocr_page_count,
            stats.images_written,
            stats.images_reused
        );
        Ok(extraction)
    }

    fn extract_page<D: PageDecoder>(
        &self,
        decoder: &D,
        index: usize,
        materializer: &Materializer<'_, D>,
        allocator: &mut ImageAllocator,
        extraction: &mut Extraction,
    ) -> Result<Slide> {
        let number = index as u32 + 1;
        let page = decoder.decode_page(index)?;
        let blocks = classify(&page);
        let mut slide = Slide::new(number);
        let mut page_stats = ExtractionStats::new();
        page_stats.add_page();

        let mut items = Vec::with_capacity(blocks.len());
        let mut text_lines = 0;
        for block in &blocks {
            let bbox = block.bbox();
            if let ContentBlock::Text { text, .. } = block {
                items.push(ContentItem::text(bbox.top(), bbox.left(), text.as_str()));
                text_lines += 1;
                continue;
            }

            let materialized = materializer.materialize(block, index, allocator)?;
            items.push(ContentItem::image(
                bbox.top(),
                bbox.left(),
                materialized.file_name(),
            ));
            match materialized {
                Materialized::Written(image) => {
                    page_stats.add_image_written();
                    extraction.images.push(image);
                }
                Materialized::Reused(_) => page_stats.add_image_reused(),
            }
        }
        page_stats.add_text_lines(text_lines);

        if text_lines == 0 {
            log::debug!("Page {}: no native text, running OCR", number);
            let bitmap = decoder.render_page(index, self.options.ocr_zoom, None)?;
            let image = bitmap.into_rgb()?;

            let fallback = self
                .options
                .fallback_enabled
                .then_some(&self.options.fallback_pass);
            let outcome = recognize_lines(&self.ocr, &image, &self.options.primary_pass, fallback)?;
            if outcome.lines.is_empty() {
                log::warn!("Page {}: OCR found no text", number);
            }

            let scale = if self.options.normalize_ocr_positions {
                self.options.ocr_zoom
            } else {
                1.0
            };
            page_stats.add_ocr_page(outcome.passes, outcome.lines.len());
            slide.ocr = Some(OcrReport {
                passes: outcome.passes,
                lines: outcome.lines.len() as u32,
            });
            items.extend(ocr_items(outcome.lines, scale));
        }

        slide.items = merge(items, self.options.tie_break);
        extraction.stats.merge(&page_stats);
        Ok(slide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OcrMode;
    use crate::error::Error;
    use crate::model::{
        Bitmap, BoundingBox, DecodedPage, ImageIdentity, OcrWord, RawBlock, RawLine,
    };
    use image::RgbImage;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct OnePage(DecodedPage);

    impl PageDecoder for OnePage {
        fn page_count(&self) -> usize {
            1
        }

        fn decode_page(&self, _index: usize) -> Result<DecodedPage> {
            Ok(self.0.clone())
        }

        fn extract_image(&self, _identity: &ImageIdentity) -> Result<Bitmap> {
            Ok(Bitmap::filled(2, 2, [0, 0, 255]))
        }

        fn render_page(
            &self,
            _index: usize,
            _zoom: f32,
            _clip: Option<&BoundingBox>,
        ) -> Result<Bitmap> {
            Ok(Bitmap::filled(3, 3, [255, 255, 255]))
        }
    }

    struct CountingOcr(Cell<u32>);

    impl OcrEngine for CountingOcr {
        fn recognize(&self, _image: &RgbImage, _mode: OcrMode) -> Result<Vec<OcrWord>> {
            self.0.set(self.0.get() + 1);
            Ok(vec![OcrWord::new("Scanned", 90.0, 30, 60).in_line(1, 1, 1)])
        }
    }

    fn text_page() -> DecodedPage {
        let bbox = BoundingBox::new(10.0, 10.0, 200.0, 30.0);
        DecodedPage::widescreen(1)
            .with_block(RawBlock::text(bbox, vec![RawLine::single(bbox, "Title")]))
    }

    #[test]
    fn test_text_page_skips_ocr() {
        let dir = TempDir::new().unwrap();
        let extractor = SlideExtractor::new(CountingOcr(Cell::new(0)));
        let result = extractor.extract(&OnePage(text_page()), dir.path()).unwrap();

        assert_eq!(extractor.ocr().0.get(), 0);
        assert!(result.slides[0].ocr.is_none());
        assert_eq!(result.text(), "=== Slide 1 ===\nTitle\n\n");
    }

    #[test]
    fn test_normalized_ocr_positions() {
        let dir = TempDir::new().unwrap();
        let options = ExtractOptions::new().with_normalized_ocr_positions(true);
        let extractor = SlideExtractor::with_options(CountingOcr(Cell::new(0)), options);
        let result = extractor
            .extract(&OnePage(DecodedPage::widescreen(1)), dir.path())
            .unwrap();

        let item = &result.slides[0].items[0];
        assert_eq!((item.top, item.left), (20.0, 10.0));
        assert_eq!(result.slides[0].ocr, Some(OcrReport { passes: 1, lines: 1 }));
    }

    #[test]
    fn test_out_of_range_selection() {
        let dir = TempDir::new().unwrap();
        let options = ExtractOptions::new().with_page_list(vec![2]);
        let extractor = SlideExtractor::with_options(CountingOcr(Cell::new(0)), options);
        let result = extractor.extract(&OnePage(text_page()), dir.path());
        assert!(matches!(result, Err(Error::PageOutOfRange(2, 1))));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let dir = TempDir::new().unwrap();
        let options = ExtractOptions::new().with_ocr_zoom(-1.0);
        let extractor = SlideExtractor::with_options(CountingOcr(Cell::new(0)), options);
        assert!(extractor.extract(&OnePage(text_page()), dir.path()).is_err());
    }
}
