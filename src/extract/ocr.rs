//! OCR fallback: word filtering, line reconstruction and the two-pass retry.

use std::collections::HashMap;

use image::RgbImage;

use super::OcrPass;
use crate::backend::OcrEngine;
use crate::error::Result;
use crate::model::{OcrLine, OcrWord};

/// Lines recovered from a page and how many engine passes it took.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OcrOutcome {
    pub lines: Vec<OcrLine>,
    pub passes: u32,
}

/// Rebuild text lines from OCR words.
///
/// Words with whitespace-only text or a confidence below `min_confidence`
/// are dropped. Survivors are grouped by (block, paragraph, line) in
/// first-seen order and joined with single spaces; a line's position is the
/// minimum over its words. The result is sorted by (top, left).
pub fn group_words(words: &[OcrWord], min_confidence: f32) -> Vec<OcrLine> {
    let mut index: HashMap<(u32, u32, u32), usize> = HashMap::new();
    let mut lines: Vec<(OcrLine, Vec<&str>)> = Vec::new();

    for word in words {
        let text = word.text.trim();
        if text.is_empty() || word.confidence < min_confidence {
            continue;
        }

        let slot = *index.entry(word.line_key()).or_insert_with(|| {
            lines.push((
                OcrLine {
                    top: word.top,
                    left: word.left,
                    text: String::new(),
                },
                Vec::new(),
            ));
            lines.len() - 1
        });

        let (line, parts) = &mut lines[slot];
        line.top = line.top.min(word.top);
        line.left = line.left.min(word.left);
        parts.push(text);
    }

    let mut lines: Vec<OcrLine> = lines
        .into_iter()
        .map(|(mut line, parts)| {
            line.text = parts.join(" ");
            line
        })
        .collect();
    lines.sort_by_key(|l| (l.top, l.left));
    lines
}

/// Run OCR on a page bitmap, retrying with `fallback` when `primary` finds
/// no lines.
pub fn recognize_lines<O: OcrEngine>(
    engine: &O,
    image: &RgbImage,
    primary: &OcrPass,
    fallback: Option<&OcrPass>,
) -> Result<OcrOutcome> {
    let words = engine.recognize(image, primary.mode)?;
    let lines = group_words(&words, primary.min_confidence);
    log::debug!(
        "OCR {}: {} words, {} lines at confidence >= {}",
        primary.mode,
        words.len(),
        lines.len(),
        primary.min_confidence
    );

    let pass = match fallback {
        Some(pass) if lines.is_empty() => pass,
        _ => return Ok(OcrOutcome { lines, passes: 1 }),
    };

    let words = engine.recognize(image, pass.mode)?;
    let lines = group_words(&words, pass.min_confidence);
    log::debug!(
        "OCR retry {}: {} words, {} lines at confidence >= {}",
        pass.mode,
        words.len(),
        lines.len(),
        pass.min_confidence
    );

    Ok(OcrOutcome { lines, passes: 2 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OcrMode;
    use std::cell::RefCell;

    fn word(text: &str, conf: f32, left: i32, top: i32, line: u32) -> OcrWord {
        OcrWord::new(text, conf, left, top).in_line(1, 1, line)
    }

    #[test]
    fn test_group_words_joins_and_takes_minimum() {
        let words = vec![
            word("Quarterly", 95.0, 120, 92, 1),
            word("Results", 91.0, 390, 90, 1),
        ];
        let lines = group_words(&words, 60.0);
        assert_eq!(
            lines,
            vec![OcrLine {
                top: 90,
                left: 120,
                text: "Quarterly Results".into()
            }]
        );
    }

    #[test]
    fn test_group_words_filters() {
        let words = vec![
            word("  ", 99.0, 0, 0, 1),
            word("", 99.0, 0, 0, 1),
            word("noise", 59.9, 5, 5, 2),
            word("edge", 60.0, 7, 7, 3),
            word("x", -1.0, 9, 9, 4),
        ];
        let lines = group_words(&words, 60.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "edge");
    }

    #[test]
    fn test_group_words_first_seen_order_within_line() {
        // Words of one line interleaved with another line keep emission order
        let words = vec![
            word("a", 90.0, 50, 10, 1),
            word("z", 90.0, 0, 40, 2),
            word("b", 90.0, 10, 12, 1),
        ];
        let lines = group_words(&words, 0.0);
        assert_eq!(lines[0].text, "a b");
        assert_eq!(lines[0].left, 10);
        assert_eq!(lines[1].text, "z");
    }

    #[test]
    fn test_group_words_sorted_by_top_then_left() {
        let words = vec![
            OcrWord::new("low", 90.0, 0, 300).in_line(1, 1, 1),
            OcrWord::new("right", 90.0, 400, 10).in_line(2, 1, 1),
            OcrWord::new("left", 90.0, 20, 10).in_line(3, 1, 1),
        ];
        let texts: Vec<String> = group_words(&words, 60.0)
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(texts, vec!["left", "right", "low"]);
    }

    struct Scripted {
        responses: RefCell<Vec<Vec<OcrWord>>>,
        modes: RefCell<Vec<OcrMode>>,
    }

    impl Scripted {
        fn new(responses: Vec<Vec<OcrWord>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                modes: RefCell::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for Scripted {
        fn recognize(&self, _image: &RgbImage, mode: OcrMode) -> Result<Vec<OcrWord>> {
            self.modes.borrow_mut().push(mode);
            let mut responses = self.responses.borrow_mut();
            Ok(if responses.is_empty() {
                Vec::new()
            } else {
                responses.remove(0)
            })
        }
    }

    fn passes() -> (OcrPass, OcrPass) {
        (
            OcrPass::new(OcrMode::SingleBlock, 60.0),
            OcrPass::new(OcrMode::SparseText, 55.0),
        )
    }

    #[test]
    fn test_no_retry_when_first_pass_finds_lines() {
        let engine = Scripted::new(vec![vec![word("Summary", 88.0, 5, 10, 1)]]);
        let (primary, fallback) = passes();
        let image = RgbImage::new(1, 1);

        let outcome = recognize_lines(&engine, &image, &primary, Some(&fallback)).unwrap();
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.lines[0].text, "Summary");
        assert_eq!(*engine.modes.borrow(), vec![OcrMode::SingleBlock]);
    }

    #[test]
    fn test_retry_uses_second_threshold() {
        // 57 fails the first pass threshold but passes the second
        let engine = Scripted::new(vec![
            vec![word("faint", 57.0, 0, 0, 1)],
            vec![word("faint", 57.0, 0, 0, 1)],
        ]);
        let (primary, fallback) = passes();
        let image = RgbImage::new(1, 1);

        let outcome = recognize_lines(&engine, &image, &primary, Some(&fallback)).unwrap();
        assert_eq!(outcome.passes, 2);
        assert_eq!(outcome.lines.len(), 1);
        assert_eq!(
            *engine.modes.borrow(),
            vec![OcrMode::SingleBlock, OcrMode::SparseText]
        );
    }

    #[test]
    fn test_retry_disabled() {
        let engine = Scripted::new(vec![]);
        let (primary, _) = passes();
        let image = RgbImage::new(1, 1);

        let outcome = recognize_lines(&engine, &image, &primary, None).unwrap();
        assert_eq!(outcome, OcrOutcome { lines: vec![], passes: 1 });
    }
}
