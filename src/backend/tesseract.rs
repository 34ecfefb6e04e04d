//! OCR backend driving the `tesseract` command-line tool.
//!
//! The bitmap is written to a temporary PNG and tesseract is asked for TSV
//! output, which carries per-word boxes, confidences and the
//! block/paragraph/line numbering used for line reconstruction.

use std::path::PathBuf;
use std::process::Command;

use image::{ImageFormat, RgbImage};

use super::{OcrEngine, OcrMode};
use crate::error::{Error, Result};
use crate::model::OcrWord;

/// TSV row level for individual words.
const WORD_LEVEL: u32 = 5;

/// Tesseract invocation settings.
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Executable to run
    pub binary: PathBuf,

    /// Language pack (`-l`)
    pub language: String,

    /// Extra arguments placed before the output format
    pub extra_args: Vec<String>,
}

impl TesseractConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the executable path.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the language pack.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Append an extra command-line argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// [`OcrEngine`] backed by the tesseract executable.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom settings.
    pub fn with_config(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    /// Check whether the executable can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &RgbImage, mode: OcrMode) -> Result<Vec<OcrWord>> {
        let input = tempfile::Builder::new()
            .prefix("unslide-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(input.path(), ImageFormat::Png)?;

        log::debug!(
            "Running {} on {}x{} bitmap, mode {}",
            self.config.binary.display(),
            image.width(),
            image.height(),
            mode
        );

        let output = Command::new(&self.config.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(mode.psm().to_string())
            .args(&self.config.extra_args)
            .arg("tsv")
            .output()
            .map_err(|e| {
                Error::ocr(
                    mode.as_str(),
                    format!("failed to run {}: {}", self.config.binary.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ocr(
                mode.as_str(),
                format!("tesseract exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
            .map_err(|message| Error::ocr(mode.as_str(), message))
    }
}

/// Column positions taken from the TSV header.
struct Columns {
    level: usize,
    block: usize,
    paragraph: usize,
    line: usize,
    left: usize,
    top: usize,
    conf: usize,
    text: usize,
}

impl Columns {
    fn from_header(header: &str) -> std::result::Result<Self, String> {
        let names: Vec<&str> = header.split('\t').map(str::trim).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| format!("TSV header lacks column '{}'", name))
        };

        Ok(Self {
            level: find("level")?,
            block: find("block_num")?,
            paragraph: find("par_num")?,
            line: find("line_num")?,
            left: find("left")?,
            top: find("top")?,
            conf: find("conf")?,
            text: find("text")?,
        })
    }
}

/// Parse tesseract TSV output into word tokens.
///
/// Only word-level rows are returned. A confidence that does not parse as a
/// number becomes -1.
pub fn parse_tsv(tsv: &str) -> std::result::Result<Vec<OcrWord>, String> {
    let mut lines = tsv.lines();
    let header = match lines.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };
    let cols = Columns::from_header(header)?;

    let mut words = Vec::new();
    for (row, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let int = |idx: usize, name: &str| -> std::result::Result<i64, String> {
            fields
                .get(idx)
                .and_then(|f| f.trim().parse::<i64>().ok())
                .ok_or_else(|| format!("row {}: invalid {}", row + 2, name))
        };

        if int(cols.level, "level")? != WORD_LEVEL as i64 {
            continue;
        }

        let confidence = fields
            .get(cols.conf)
            .and_then(|c| c.trim().parse::<f32>().ok())
            .unwrap_or(-1.0);
        let text = fields.get(cols.text).copied().unwrap_or("");

        words.push(OcrWord {
            text: text.to_string(),
            confidence,
            left: int(cols.left, "left")? as i32,
            top: int(cols.top, "top")? as i32,
            block: int(cols.block, "block_num")? as u32,
            paragraph: int(cols.paragraph, "par_num")? as u32,
            line: int(cols.line, "line_num")? as u32,
        });
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\t\
                          left\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t2880\t1620\t-1\t
2\t1\t1\t0\t0\t0\t120\t90\t600\t60\t-1\t
4\t1\t1\t1\t1\t0\t120\t90\t600\t60\t-1\t
5\t1\t1\t1\t1\t1\t120\t92\t250\t58\t96.412\tQuarterly
5\t1\t1\t1\t1\t2\t390\t90\t330\t60\t91.7\tResults
5\t1\t1\t1\t2\t1\t120\t200\t40\t40\tabc\t~
";

    #[test]
    fn test_parse_tsv_words_only() {
        let words = parse_tsv(SAMPLE).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Quarterly");
        assert_eq!(words[0].line_key(), (1, 1, 1));
        assert_eq!((words[0].left, words[0].top), (120, 92));
        assert!((words[1].confidence - 91.7).abs() < 1e-4);
    }

    #[test]
    fn test_parse_tsv_bad_confidence_is_negative() {
        let words = parse_tsv(SAMPLE).unwrap();
        assert_eq!(words[2].confidence, -1.0);
        assert_eq!(words[2].line, 2);
    }

    #[test]
    fn test_parse_tsv_empty_output() {
        assert!(parse_tsv("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_tsv_missing_column() {
        let result = parse_tsv("level\ttop\n5\t1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_tsv_invalid_number() {
        let tsv = "level\tblock_num\tpar_num\tline_num\tleft\ttop\tconf\ttext\n\
                   5\t1\t1\t1\tx\t0\t90\tHi\n";
        let err = parse_tsv(tsv).unwrap_err();
        assert!(err.contains("left"));
    }

    #[test]
    fn test_missing_binary_is_ocr_error() {
        let engine = TesseractEngine::with_config(
            TesseractConfig::new().with_binary("/nonexistent/unslide-tesseract"),
        );
        assert!(!engine.is_available());

        let image = RgbImage::new(4, 4);
        let result = engine.recognize(&image, OcrMode::SingleBlock);
        assert!(matches!(result, Err(Error::Ocr { .. })));
    }

    #[test]
    fn test_config_builder() {
        let config = TesseractConfig::new()
            .with_language("deu")
            .with_arg("--oem")
            .with_arg("1");
        assert_eq!(config.language, "deu");
        assert_eq!(config.extra_args, vec!["--oem", "1"]);
        assert_eq!(config.binary, PathBuf::from("tesseract"));
    }
}
