//! Block classification.

use crate::model::{ContentBlock, DecodedPage, RawBlock};

/// Partition a decoded page into typed content blocks.
///
/// Each non-empty line of a text block becomes its own text block, using the
/// line's box (or the enclosing block's when the line has none). Image and
/// other blocks map one to one. Page order is preserved.
pub fn classify(page: &DecodedPage) -> Vec<ContentBlock> {
    let mut blocks = Vec::with_capacity(page.blocks.len());

    for raw in &page.blocks {
        match raw {
            RawBlock::Text { bbox, lines } => {
                for line in lines {
                    let joined = line.raw_text();
                    let text = joined.trim();
                    if text.is_empty() {
                        continue;
                    }
                    blocks.push(ContentBlock::Text {
                        bbox: line.bbox.unwrap_or(*bbox),
                        text: text.to_string(),
                    });
                }
            }
            RawBlock::Image { bbox, identity } => blocks.push(ContentBlock::RasterImage {
                bbox: *bbox,
                identity: identity.clone(),
            }),
            RawBlock::Other { bbox, .. } => blocks.push(ContentBlock::Other { bbox: *bbox }),
        }
    }

    blocks
}
