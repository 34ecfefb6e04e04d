//! Image placeholder scanning.

use regex::Regex;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(IMAGE_\d{4,}\.png)\]").expect("valid placeholder regex"))
}

/// Image file names referenced by `[IMAGE_dddd.png]` placeholders, in
/// order of appearance. Repeated references are repeated.
pub fn placeholder_names(text: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

/// Referenced names with no entry in `available`, deduplicated.
pub fn missing_placeholders<'a, I>(text: &str, available: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let available: Vec<&str> = available.into_iter().collect();
    let mut missing: Vec<String> = Vec::new();
    for name in placeholder_names(text) {
        if !available.contains(&name.as_str()) && !missing.contains(&name) {
            missing.push(name);
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_names() {
        let text = "=== Slide 1 ===\n[IMAGE_0001.png]\nText [x]\n\
                    [IMAGE_0002.png]\n[IMAGE_0001.png]\n";
        assert_eq!(
            placeholder_names(text),
            vec!["IMAGE_0001.png", "IMAGE_0002.png", "IMAGE_0001.png"]
        );
    }

    #[test]
    fn test_ignores_malformed() {
        assert!(placeholder_names("[IMAGE_01.png] [image_0001.png] IMAGE_0001.png").is_empty());
    }

    #[test]
    fn test_missing_placeholders() {
        let text = "[IMAGE_0001.png]\n[IMAGE_0002.png]\n[IMAGE_0002.png]\n";
        let missing = missing_placeholders(text, ["IMAGE_0001.png"]);
        assert_eq!(missing, vec!["IMAGE_0002.png"]);
    }
}
