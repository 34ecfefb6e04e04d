//! Slide stream rendering.

use std::fmt::Write;

use crate::model::Slide;

/// Header line introducing a slide.
pub fn slide_header(number: u32) -> String {
    format!("=== Slide {} ===", number)
}

/// Render slides as the placeholder text stream.
///
/// Each slide is a header, one line per item and a blank separator line.
pub fn render_slides(slides: &[Slide]) -> String {
    let mut out = String::new();
    for slide in slides {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{}", slide_header(slide.number));
        for item in &slide.items {
            let _ = writeln!(out, "{}", item.render());
        }
        out.push('\n');
    }
    out
}
