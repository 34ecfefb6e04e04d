//! Image materialization: block to PNG file, memoized by resource identity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::backend::PageDecoder;
use crate::error::{Error, Result};
use crate::model::{ContentBlock, ImageIdentity, ImageOrigin, MaterializedImage};

/// File name for an image sequence number.
pub fn image_file_name(sequence: u32) -> String {
    format!("IMAGE_{:04}.png", sequence)
}

/// Document-scoped image numbering and identity memo.
///
/// Created at the start of one document and dropped at its end.
#[derive(Debug, Default)]
pub struct ImageAllocator {
    last: u32,
    by_identity: HashMap<ImageIdentity, String>,
}

impl ImageAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// File name previously recorded for an identity.
    pub fn lookup(&self, identity: &ImageIdentity) -> Option<&str> {
        self.by_identity.get(identity).map(String::as_str)
    }

    /// Take the next sequence number and its file name.
    pub fn allocate(&mut self) -> (u32, String) {
        self.last += 1;
        (self.last, image_file_name(self.last))
    }

    /// Remember the file written for an identity.
    pub fn record(&mut self, identity: ImageIdentity, file_name: String) {
        self.by_identity.insert(identity, file_name);
    }

    /// Number of sequence numbers handed out so far.
    pub fn allocated(&self) -> u32 {
        self.last
    }
}

/// Outcome of materializing one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// A new file was written
    Written(MaterializedImage),
    /// An earlier file was reused
    Reused(String),
}

impl Materialized {
    pub fn file_name(&self) -> &str {
        match self {
            Materialized::Written(image) => &image.file_name,
            Materialized::Reused(name) => name,
        }
    }
}

/// Writes PNG files for non-text blocks into one directory.
pub struct Materializer<'a, D: PageDecoder> {
    decoder: &'a D,
    images_dir: &'a Path,
    crop_zoom: f32,
}

impl<'a, D: PageDecoder> Materializer<'a, D> {
    pub fn new(decoder: &'a D, images_dir: &'a Path, crop_zoom: f32) -> Self {
        Self {
            decoder,
            images_dir,
            crop_zoom,
        }
    }

    /// Produce the image file for a non-text block.
    ///
    /// `page_index` is 0-based. Text blocks are rejected.
    pub fn materialize(
        &self,
        block: &ContentBlock,
        page_index: usize,
        allocator: &mut ImageAllocator,
    ) -> Result<Materialized> {
        let page = page_index as u32 + 1;

        if let Some(identity) = block.identity() {
            if let Some(name) = allocator.lookup(identity) {
                log::debug!("Page {}: reusing {} for image {}", page, name, identity);
                return Ok(Materialized::Reused(name.to_string()));
            }

            let bitmap = self.decoder.extract_image(identity)?;
            let (sequence, file_name) = allocator.allocate();
            bitmap.into_rgb()?.save_with_format(self.path_for(&file_name), ImageFormat::Png)?;
            allocator.record(identity.clone(), file_name.clone());

            log::debug!("Page {}: wrote {} for image {}", page, file_name, identity);
            return Ok(Materialized::Written(MaterializedImage {
                file_name,
                sequence,
                source_identity: Some(identity.clone()),
                origin: ImageOrigin::Embedded,
                page,
            }));
        }

        let bbox = match block {
            ContentBlock::Text { .. } => {
                return Err(Error::Other("text blocks are not materialized".to_string()))
            }
            other => other.bbox(),
        };

        let bitmap = self
            .decoder
            .render_page(page_index, self.crop_zoom, Some(bbox))?;
        let (sequence, file_name) = allocator.allocate();
        bitmap.into_rgb()?.save_with_format(self.path_for(&file_name), ImageFormat::Png)?;

        log::debug!(
            "Page {}: wrote {} from {} region at zoom {}",
            page,
            file_name,
            block.kind(),
            self.crop_zoom
        );
        Ok(Materialized::Written(MaterializedImage {
            file_name,
            sequence,
            source_identity: None,
            origin: ImageOrigin::RegionCrop,
            page,
        }))
    }

    fn path_for(&self, file_name: &str) -> PathBuf {
        self.images_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_padding() {
        assert_eq!(image_file_name(1), "IMAGE_0001.png");
        assert_eq!(image_file_name(42), "IMAGE_0042.png");
        assert_eq!(image_file_name(12345), "IMAGE_12345.png");
    }

    #[test]
    fn test_allocator_counts_and_memoizes() {
        let mut allocator = ImageAllocator::new();
        let id = ImageIdentity::new("17");
        assert!(allocator.lookup(&id).is_none());

        let (seq, name) = allocator.allocate();
        assert_eq!((seq, name.as_str()), (1, "IMAGE_0001.png"));
        allocator.record(id.clone(), name);

        assert_eq!(allocator.lookup(&id), Some("IMAGE_0001.png"));
        assert_eq!(allocator.allocate().0, 2);
        assert_eq!(allocator.allocated(), 2);
    }

    #[test]
    fn test_allocators_are_independent() {
        let mut a = ImageAllocator::new();
        let b = ImageAllocator::new();
        let (_, name) = a.allocate();
        a.record(ImageIdentity::new("x"), name);
        assert!(b.lookup(&ImageIdentity::new("x")).is_none());
        assert_eq!(b.allocated(), 0);
    }
}
