//! Extraction options and configuration.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::backend::OcrMode;
use crate::error::{Error, Result};

/// Options controlling how a deck is extracted.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Magnification for region crops of identity-less images
    pub crop_zoom: f32,

    /// Magnification for full-page OCR renders
    pub ocr_zoom: f32,

    /// First OCR pass
    pub primary_pass: OcrPass,

    /// Retry pass, used when the first pass yields no lines
    pub fallback_pass: OcrPass,

    /// Whether the retry pass runs at all
    pub fallback_enabled: bool,

    /// Divide OCR positions by `ocr_zoom` so they share page units with
    /// native blocks. Off by default: OCR lines keep bitmap pixels.
    pub normalize_ocr_positions: bool,

    /// Pages to extract
    pub page_selection: PageSelection,

    /// Order of a text item and an image item at the same position
    pub tie_break: TieBreak,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region crop magnification.
    pub fn with_crop_zoom(mut self, zoom: f32) -> Self {
        self.crop_zoom = zoom;
        self
    }

    /// Set the OCR render magnification.
    pub fn with_ocr_zoom(mut self, zoom: f32) -> Self {
        self.ocr_zoom = zoom;
        self
    }

    /// Set the first OCR pass.
    pub fn with_primary_pass(mut self, pass: OcrPass) -> Self {
        self.primary_pass = pass;
        self
    }

    /// Set the retry OCR pass.
    pub fn with_fallback_pass(mut self, pass: OcrPass) -> Self {
        self.fallback_pass = pass;
        self
    }

    /// Enable or disable the retry OCR pass.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    /// Report OCR positions in page units instead of bitmap pixels.
    pub fn with_normalized_ocr_positions(mut self, normalize: bool) -> Self {
        self.normalize_ocr_positions = normalize;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Set specific pages.
    pub fn with_page_list(mut self, pages: Vec<u32>) -> Self {
        self.page_selection = PageSelection::from_pages(pages);
        self
    }

    /// Set the tie-break order.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Check magnifications and thresholds.
    pub fn validate(&self) -> Result<()> {
        for (name, zoom) in [("crop", self.crop_zoom), ("OCR", self.ocr_zoom)] {
            if !(zoom.is_finite() && zoom > 0.0) {
                return Err(Error::Other(format!(
                    "{} magnification must be positive, got {}",
                    name, zoom
                )));
            }
        }
        for pass in [&self.primary_pass, &self.fallback_pass] {
            if !(0.0..=100.0).contains(&pass.min_confidence) {
                return Err(Error::Other(format!(
                    "confidence threshold {} is outside 0-100",
                    pass.min_confidence
                )));
            }
        }
        Ok(())
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            crop_zoom: 2.0,
            ocr_zoom: 3.0,
            primary_pass: OcrPass::new(OcrMode::SingleBlock, 60.0),
            fallback_pass: OcrPass::new(OcrMode::SparseText, 55.0),
            fallback_enabled: true,
            normalize_ocr_positions: false,
            page_selection: PageSelection::All,
            tie_break: TieBreak::TextFirst,
        }
    }
}

/// One OCR attempt: a segmentation mode and the minimum word confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcrPass {
    pub mode: OcrMode,

    /// Words below this confidence (0-100) are discarded
    pub min_confidence: f32,
}

impl OcrPass {
    pub fn new(mode: OcrMode, min_confidence: f32) -> Self {
        Self {
            mode,
            min_confidence,
        }
    }
}

/// Which item goes first when a text and an image share a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    TextFirst,
    ImageFirst,
}

/// Page selection for extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Extract all pages
    #[default]
    All,
    /// Extract a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Extract several disjoint ranges, sorted and non-adjacent (1-indexed)
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Select individual pages.
    pub fn from_pages(pages: impl IntoIterator<Item = u32>) -> Self {
        PageSelection::Ranges(coalesce(pages.into_iter().map(|p| p..=p).collect()))
    }

    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Ranges(ranges) => {
                let idx = ranges.partition_point(|r| *r.end() < page);
                ranges.get(idx).map_or(false, |r| r.contains(&page))
            }
        }
    }

    /// Fail when the selection names a page past the end of the document.
    pub fn check_bounds(&self, page_count: u32) -> Result<()> {
        let last = match self {
            PageSelection::All => return Ok(()),
            PageSelection::Range(range) => *range.end(),
            PageSelection::Ranges(ranges) => ranges.last().map_or(0, |r| *r.end()),
        };
        if last > page_count {
            return Err(Error::PageOutOfRange(last, page_count));
        }
        Ok(())
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let invalid = |what: &str| Error::InvalidPageRange(format!("{} in '{}'", what, s));
        let number = |part: &str| -> Result<u32> {
            match part.trim().parse::<u32>() {
                Ok(0) => Err(invalid("pages are 1-indexed")),
                Ok(p) => Ok(p),
                Err(_) => Err(invalid("invalid page number")),
            }
        };
        let range = |part: &str| -> Result<RangeInclusive<u32>> {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (number(start)?, number(end)?);
                    if start > end {
                        return Err(invalid("range start after end"));
                    }
                    Ok(start..=end)
                }
                None => {
                    let page = number(part)?;
                    Ok(page..=page)
                }
            }
        };

        // Simple range (e.g., "1-10")
        if !s.contains(',') && s.contains('-') {
            return Ok(PageSelection::Range(range(s)?));
        }

        let ranges = s
            .split(',')
            .map(|part| range(part.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(PageSelection::Ranges(coalesce(ranges)))
    }
}

/// Sort ranges and merge the ones that overlap or touch.
fn coalesce(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_unstable_by_key(|r| *r.start());
    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if *range.start() <= last.end().saturating_add(1) => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}
