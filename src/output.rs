//! On-disk layout of one extraction run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};

use crate::error::Result;

/// Subdirectory holding `IMAGE_dddd.png` files.
pub const IMAGES_DIR: &str = "images";

/// File name of the slide stream.
pub const TEXT_FILE: &str = "slides_with_placeholders.txt";

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Paths of a run directory: `<root>/images/` and
/// `<root>/slides_with_placeholders.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Use `root` as the run directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run directory `<YYYYMMDD-HHMMSS>_<stem>` beside the input file.
    pub fn timestamped(input: &Path) -> Self {
        Self::timestamped_at(input, &Local::now())
    }

    /// [`timestamped`](Self::timestamped) with an explicit clock reading.
    pub fn timestamped_at<Tz: TimeZone>(input: &Path, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let name = format!("{}_{}", now.format(TIMESTAMP_FORMAT), stem);
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        Self::new(parent.join(name))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn text_path(&self) -> PathBuf {
        self.root.join(TEXT_FILE)
    }

    /// Create the run and images directories.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(self.images_dir())?;
        Ok(())
    }

    /// Write the slide stream, returning its path.
    pub fn write_text(&self, text: &str) -> Result<PathBuf> {
        let path = self.text_path();
        fs::create_dir_all(&self.root)?;
        fs::write(&path, text)?;
        log::debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(path)
    }

    /// Image files present in the images directory, sorted by name.
    pub fn list_images(&self) -> Result<Vec<String>> {
        let dir = self.images_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_timestamped_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let layout = OutputLayout::timestamped_at(Path::new("/decks/Lecture 4.pdf"), &now);
        assert_eq!(
            layout.root(),
            Path::new("/decks/20240305-140709_Lecture 4")
        );
        assert_eq!(
            layout.text_path(),
            Path::new("/decks/20240305-140709_Lecture 4/slides_with_placeholders.txt")
        );
    }

    #[test]
    fn test_prepare_and_write() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("run"));
        layout.prepare().unwrap();
        assert!(layout.images_dir().is_dir());

        let path = layout.write_text("=== Slide 1 ===\n\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "=== Slide 1 ===\n\n");

        fs::write(layout.images_dir().join("IMAGE_0002.png"), b"x").unwrap();
        fs::write(layout.images_dir().join("IMAGE_0001.png"), b"x").unwrap();
        assert_eq!(
            layout.list_images().unwrap(),
            vec!["IMAGE_0001.png", "IMAGE_0002.png"]
        );
    }
}
