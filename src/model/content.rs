//! Classified blocks, OCR results and the merged per-slide content stream.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BoundingBox, ImageIdentity};

/// Kind of a classified block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    RasterImage,
    Other,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Text => write!(f, "text"),
            BlockKind::RasterImage => write!(f, "raster image"),
            BlockKind::Other => write!(f, "other"),
        }
    }
}

/// One classified region of a page.
///
/// Text blocks hold exactly one non-empty, trimmed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        bbox: BoundingBox,
        text: String,
    },
    RasterImage {
        bbox: BoundingBox,
        identity: Option<ImageIdentity>,
    },
    Other {
        bbox: BoundingBox,
    },
}

impl ContentBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Text { .. } => BlockKind::Text,
            ContentBlock::RasterImage { .. } => BlockKind::RasterImage,
            ContentBlock::Other { .. } => BlockKind::Other,
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        match self {
            ContentBlock::Text { bbox, .. }
            | ContentBlock::RasterImage { bbox, .. }
            | ContentBlock::Other { bbox } => bbox,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlock::Text { .. })
    }

    /// Resource identity eligible for memoization, if any.
    pub fn identity(&self) -> Option<&ImageIdentity> {
        match self {
            ContentBlock::RasterImage { identity, .. } => identity.as_ref(),
            _ => None,
        }
    }
}

/// One word reported by an OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,

    /// Confidence 0-100; engines report -1 for non-word rows
    pub confidence: f32,

    /// Left edge in bitmap pixels
    pub left: i32,

    /// Top edge in bitmap pixels
    pub top: i32,

    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

impl OcrWord {
    /// Create a word.
    pub fn new(text: impl Into<String>, confidence: f32, left: i32, top: i32) -> Self {
        Self {
            text: text.into(),
            confidence,
            left,
            top,
            block: 0,
            paragraph: 0,
            line: 0,
        }
    }

    /// Set the engine's (block, paragraph, line) grouping.
    pub fn in_line(mut self, block: u32, paragraph: u32, line: u32) -> Self {
        self.block = block;
        self.paragraph = paragraph;
        self.line = line;
        self
    }

    /// Grouping key identifying the engine line this word belongs to.
    pub fn line_key(&self) -> (u32, u32, u32) {
        (self.block, self.paragraph, self.line)
    }
}

/// A line of text reconstructed from OCR words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrLine {
    /// Minimum top over member words, in bitmap pixels
    pub top: i32,

    /// Minimum left over member words, in bitmap pixels
    pub left: i32,

    /// Member words joined by single spaces
    pub text: String,
}

/// Payload of a merged content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemPayload {
    Text { text: String },
    Image { file_name: String },
}

/// One positioned entry of a slide's reading-order stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub top: f32,
    pub left: f32,
    #[serde(flatten)]
    pub payload: ItemPayload,
}

impl ContentItem {
    /// Create a text item.
    pub fn text(top: f32, left: f32, text: impl Into<String>) -> Self {
        Self {
            top,
            left,
            payload: ItemPayload::Text { text: text.into() },
        }
    }

    /// Create an image placeholder item.
    pub fn image(top: f32, left: f32, file_name: impl Into<String>) -> Self {
        Self {
            top,
            left,
            payload: ItemPayload::Image {
                file_name: file_name.into(),
            },
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.payload, ItemPayload::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self.payload, ItemPayload::Image { .. })
    }

    /// Text content, or the image file name for placeholders.
    pub fn value(&self) -> &str {
        match &self.payload {
            ItemPayload::Text { text } => text,
            ItemPayload::Image { file_name } => file_name,
        }
    }

    /// Output line for the slide stream.
    pub fn render(&self) -> String {
        match &self.payload {
            ItemPayload::Text { text } => text.clone(),
            ItemPayload::Image { file_name } => format!("[{}]", file_name),
        }
    }
}

/// How a materialized image was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    /// Extracted from an embedded image resource
    Embedded,
    /// Rendered from a page region
    RegionCrop,
}

/// An image written to the output images directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedImage {
    /// `IMAGE_%04d.png`
    pub file_name: String,

    /// 1-based sequence number
    pub sequence: u32,

    /// Identity the image was derived from; `None` for crops
    pub source_identity: Option<ImageIdentity>,

    pub origin: ImageOrigin,

    /// Page on which the image was first produced (1-indexed)
    pub page: u32,
}

/// OCR activity on one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OcrReport {
    /// Number of engine invocations (1 or 2)
    pub passes: u32,

    /// Lines contributed to the slide
    pub lines: u32,
}

/// Merged content of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Page number (1-indexed)
    pub number: u32,

    /// Items in reading order
    pub items: Vec<ContentItem>,

    /// Present when the OCR fallback ran for this page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrReport>,
}

impl Slide {
    /// Create an empty slide.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            items: Vec::new(),
            ocr: None,
        }
    }

    pub fn text_items(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|i| i.is_text())
    }

    pub fn image_names(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|i| i.is_image())
            .map(|i| i.value())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
