//! Extraction result with statistics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::render_slides;
use crate::model::{MaterializedImage, Slide};

/// Result of extracting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Extracted slides in page order
    pub slides: Vec<Slide>,

    /// Images written, in creation order
    pub images: Vec<MaterializedImage>,

    /// Directory the images were written to
    pub images_dir: PathBuf,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl Extraction {
    /// Create an empty result for an images directory.
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            slides: Vec::new(),
            images: Vec::new(),
            images_dir: images_dir.into(),
            stats: ExtractionStats::default(),
        }
    }

    /// Slide stream with image placeholders.
    pub fn text(&self) -> String {
        render_slides(&self.slides)
    }

    /// Image file names in creation order.
    pub fn image_names(&self) -> Vec<String> {
        self.images.iter().map(|i| i.file_name.clone()).collect()
    }

    /// Compact summary for JSON output.
    pub fn summary(&self) -> Summary {
        Summary {
            txt_content: self.text(),
            image_count: self.images.len(),
            images: self.image_names(),
        }
    }
}

/// Text stream plus the list of written images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub txt_content: String,
    pub image_count: usize,
    pub images: Vec<String>,
}

/// Statistics collected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages processed
    pub page_count: u32,

    /// Native text lines emitted
    pub text_line_count: u32,

    /// Pages that went through OCR
    pub ocr_page_count: u32,

    /// Lines recovered by OCR
    pub ocr_line_count: u32,

    /// OCR retries with the fallback pass
    pub fallback_pass_count: u32,

    /// Image files written
    pub images_written: u32,

    /// Image references served from an earlier file
    pub images_reused: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Record native text lines.
    pub fn add_text_lines(&mut self, count: usize) {
        self.text_line_count += count as u32;
    }

    /// Record one OCR'd page.
    pub fn add_ocr_page(&mut self, passes: u32, lines: usize) {
        self.ocr_page_count += 1;
        self.ocr_line_count += lines as u32;
        if passes > 1 {
            self.fallback_pass_count += 1;
        }
    }

    /// Increment written image count.
    pub fn add_image_written(&mut self) {
        self.images_written += 1;
    }

    /// Increment reused image count.
    pub fn add_image_reused(&mut self) {
        self.images_reused += 1;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.text_line_count += other.text_line_count;
        self.ocr_page_count += other.ocr_page_count;
        self.ocr_line_count += other.ocr_line_count;
        self.fallback_pass_count += other.fallback_pass_count;
        self.images_written += other.images_written;
        self.images_reused += other.images_reused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentItem, ImageOrigin};

    #[test]
    fn test_stats_ocr_page() {
        let mut stats = ExtractionStats::new();
        stats.add_ocr_page(1, 3);
        stats.add_ocr_page(2, 0);
        assert_eq!(stats.ocr_page_count, 2);
        assert_eq!(stats.ocr_line_count, 3);
        assert_eq!(stats.fallback_pass_count, 1);
    }

    #[test]
    fn test_stats_merge() {
        let mut a = ExtractionStats::new();
        a.add_page();
        a.add_image_written();
        let mut b = ExtractionStats::new();
        b.add_page();
        b.add_image_reused();
        b.add_text_lines(4);

        a.merge(&b);
        assert_eq!(a.page_count, 2);
        assert_eq!(a.images_written, 1);
        assert_eq!(a.images_reused, 1);
        assert_eq!(a.text_line_count, 4);
    }

    #[test]
    fn test_summary() {
        let mut extraction = Extraction::new("/tmp/images");
        let mut slide = Slide::new(1);
        slide.items.push(ContentItem::image(0.0, 0.0, "IMAGE_0001.png"));
        extraction.slides.push(slide);
        extraction.images.push(MaterializedImage {
            file_name: "IMAGE_0001.png".into(),
            sequence: 1,
            source_identity: None,
            origin: ImageOrigin::RegionCrop,
            page: 1,
        });

        let summary = extraction.summary();
        assert_eq!(summary.image_count, 1);
        assert_eq!(summary.images, vec!["IMAGE_0001.png"]);
        assert_eq!(summary.txt_content, "=== Slide 1 ===\n[IMAGE_0001.png]\n\n");
    }
}
