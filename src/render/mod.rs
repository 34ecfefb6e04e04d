//! Rendering module for turning extracted slides into output formats.

mod json;
mod placeholders;
mod result;
mod text;

pub use json::{to_json, JsonFormat};
pub use placeholders::{missing_placeholders, placeholder_names};
pub use result::{Extraction, ExtractionStats, Summary};
pub use text::{render_slides, slide_header};
