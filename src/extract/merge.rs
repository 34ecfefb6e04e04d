//! Reading-order merge of text and image items.

use std::cmp::Ordering;

use super::TieBreak;
use crate::model::{ContentItem, OcrLine};

/// Sort items by top, then left, then kind according to `tie_break`.
///
/// The sort is stable: items equal on all three keys keep their input order.
pub fn merge(mut items: Vec<ContentItem>, tie_break: TieBreak) -> Vec<ContentItem> {
    items.sort_by(|a, b| reading_order(a, b, tie_break));
    items
}

fn reading_order(a: &ContentItem, b: &ContentItem, tie_break: TieBreak) -> Ordering {
    a.top
        .total_cmp(&b.top)
        .then_with(|| a.left.total_cmp(&b.left))
        .then_with(|| kind_rank(a, tie_break).cmp(&kind_rank(b, tie_break)))
}

fn kind_rank(item: &ContentItem, tie_break: TieBreak) -> u8 {
    match (item.is_text(), tie_break) {
        (true, TieBreak::TextFirst) | (false, TieBreak::ImageFirst) => 0,
        _ => 1,
    }
}

/// Convert OCR lines into text items, dividing positions by `scale`.
pub fn ocr_items(lines: Vec<OcrLine>, scale: f32) -> impl Iterator<Item = ContentItem> {
    lines
        .into_iter()
        .map(move |line| {
            ContentItem::text(
                line.top as f32 / scale,
                line.left as f32 / scale,
                line.text,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.value()).collect()
    }

    #[test]
    fn test_sorted_by_top_then_left() {
        let items = vec![
            ContentItem::text(100.0, 10.0, "body"),
            ContentItem::image(20.0, 500.0, "IMAGE_0001.png"),
            ContentItem::text(20.0, 40.0, "title"),
        ];
        let merged = merge(items, TieBreak::TextFirst);
        assert_eq!(values(&merged), vec!["title", "IMAGE_0001.png", "body"]);
    }

    #[test]
    fn test_text_before_image_on_tie() {
        let items = vec![
            ContentItem::image(50.0, 50.0, "IMAGE_0003.png"),
            ContentItem::text(50.0, 50.0, "caption"),
        ];
        let merged = merge(items.clone(), TieBreak::TextFirst);
        assert_eq!(values(&merged), vec!["caption", "IMAGE_0003.png"]);

        let merged = merge(items, TieBreak::ImageFirst);
        assert_eq!(values(&merged), vec!["IMAGE_0003.png", "caption"]);
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let items = vec![
            ContentItem::text(0.0, 0.0, "first"),
            ContentItem::text(0.0, 0.0, "second"),
            ContentItem::image(0.0, 0.0, "IMAGE_0002.png"),
            ContentItem::image(0.0, 0.0, "IMAGE_0001.png"),
        ];
        let merged = merge(items, TieBreak::TextFirst);
        assert_eq!(
            values(&merged),
            vec!["first", "second", "IMAGE_0002.png", "IMAGE_0001.png"]
        );
    }

    #[test]
    fn test_ocr_items_scaled() {
        let lines = vec![OcrLine {
            top: 30,
            left: 90,
            text: "Summary".into(),
        }];
        let items: Vec<ContentItem> = ocr_items(lines.clone(), 1.0).collect();
        assert_eq!(items[0].top, 30.0);

        let items: Vec<ContentItem> = ocr_items(lines, 3.0).collect();
        assert_eq!((items[0].top, items[0].left), (10.0, 30.0));
        assert_eq!(items[0].value(), "Summary");
    }
}
