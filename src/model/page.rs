//! Decoded page representation handed over by a [`PageDecoder`].
//!
//! [`PageDecoder`]: crate::backend::PageDecoder

use serde::{Deserialize, Serialize};
use std::fmt;

use super::BoundingBox;

/// Block type code for text blocks.
pub const BLOCK_TYPE_TEXT: u32 = 0;

/// Block type code for image blocks.
pub const BLOCK_TYPE_IMAGE: u32 = 1;

/// A single decoded page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedPage {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Content blocks in the order the decoder produced them
    pub blocks: Vec<RawBlock>,
}

impl DecodedPage {
    /// Create a new, empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create a new page with the 16:9 slide size used by most presentation tools.
    pub fn widescreen(number: u32) -> Self {
        Self::new(number, 960.0, 540.0)
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: RawBlock) {
        self.blocks.push(block);
    }

    /// Builder-style variant of [`add_block`](Self::add_block).
    pub fn with_block(mut self, block: RawBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Page area in square points.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Iterate over image blocks.
    pub fn image_blocks(&self) -> impl Iterator<Item = &RawBlock> {
        self.blocks.iter().filter(|b| b.is_image())
    }
}

/// Stable handle to an embedded image resource.
///
/// Two blocks that reference the same underlying resource within one
/// document carry equal identities. The value is opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageIdentity(String);

impl ImageIdentity {
    /// Wrap a backend-specific identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Backend-specific identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A block as found in the page description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawBlock {
    /// Text block (type code 0)
    Text {
        bbox: BoundingBox,
        lines: Vec<RawLine>,
    },

    /// Image block (type code 1)
    Image {
        bbox: BoundingBox,
        /// Resource identity, absent for inline images and covers
        identity: Option<ImageIdentity>,
    },

    /// Any other block type (vector drawings, shadings, forms)
    Other { bbox: BoundingBox, type_code: u32 },
}

impl RawBlock {
    /// Create a text block.
    pub fn text(bbox: BoundingBox, lines: Vec<RawLine>) -> Self {
        RawBlock::Text { bbox, lines }
    }

    /// Create an image block referencing an embedded resource.
    pub fn image(bbox: BoundingBox, identity: impl Into<String>) -> Self {
        RawBlock::Image {
            bbox,
            identity: Some(ImageIdentity::new(identity)),
        }
    }

    /// Create an image block without a resource identity.
    pub fn anonymous_image(bbox: BoundingBox) -> Self {
        RawBlock::Image {
            bbox,
            identity: None,
        }
    }

    /// Create a block of any other type.
    pub fn other(bbox: BoundingBox, type_code: u32) -> Self {
        RawBlock::Other { bbox, type_code }
    }

    /// Numeric block type, as used by page-description formats.
    pub fn type_code(&self) -> u32 {
        match self {
            RawBlock::Text { .. } => BLOCK_TYPE_TEXT,
            RawBlock::Image { .. } => BLOCK_TYPE_IMAGE,
            RawBlock::Other { type_code, .. } => *type_code,
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        match self {
            RawBlock::Text { bbox, .. }
            | RawBlock::Image { bbox, .. }
            | RawBlock::Other { bbox, .. } => bbox,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RawBlock::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, RawBlock::Image { .. })
    }
}

/// A line inside a text block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLine {
    /// Line bounding box; the block's box is used when absent
    pub bbox: Option<BoundingBox>,
    pub spans: Vec<RawSpan>,
}

impl RawLine {
    /// Create a line from its spans.
    pub fn new(bbox: Option<BoundingBox>, spans: Vec<RawSpan>) -> Self {
        Self { bbox, spans }
    }

    /// Create a line holding a single span.
    pub fn single(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self::new(Some(bbox), vec![RawSpan::new(text)])
    }

    /// Span texts concatenated without separators.
    pub fn raw_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A run of text sharing one font within a line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSpan {
    pub text: String,
}

impl RawSpan {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = DecodedPage::new(1, 612.0, 792.0);
        assert_eq!(page.number, 1);
        assert_eq!(page.area(), 612.0 * 792.0);
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_block_type_codes() {
        let bbox = BoundingBox::default();
        assert_eq!(RawBlock::text(bbox, vec![]).type_code(), BLOCK_TYPE_TEXT);
        assert_eq!(RawBlock::image(bbox, "7").type_code(), BLOCK_TYPE_IMAGE);
        assert_eq!(RawBlock::other(bbox, 3).type_code(), 3);
    }

    #[test]
    fn test_raw_text_has_no_separators() {
        let line = RawLine::new(
            None,
            vec![RawSpan::new(" Hel"), RawSpan::new("lo"), RawSpan::new(" ")],
        );
        assert_eq!(line.raw_text(), " Hello ");
    }

    #[test]
    fn test_image_blocks_filter() {
        let bbox = BoundingBox::default();
        let page = DecodedPage::widescreen(2)
            .with_block(RawBlock::text(bbox, vec![]))
            .with_block(RawBlock::anonymous_image(bbox))
            .with_block(RawBlock::other(bbox, 2));
        assert_eq!(page.image_blocks().count(), 1);
    }
}
