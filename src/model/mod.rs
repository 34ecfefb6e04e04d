//! Data model shared by decoders, the extraction pipeline and renderers.
//!
//! Decoders produce [`DecodedPage`]s and [`Bitmap`]s. The pipeline turns them
//! into [`ContentBlock`]s, [`OcrLine`]s and finally per-page [`Slide`]s made
//! of [`ContentItem`]s.

mod bitmap;
mod content;
mod geometry;
mod page;

pub use bitmap::Bitmap;
pub use content::{
    BlockKind, ContentBlock, ContentItem, ImageOrigin, ItemPayload, MaterializedImage, OcrLine,
    OcrReport, OcrWord, Slide,
};
pub use geometry::BoundingBox;
pub use page::{
    DecodedPage, ImageIdentity, RawBlock, RawLine, RawSpan, BLOCK_TYPE_IMAGE, BLOCK_TYPE_TEXT,
};
