//! Raster bitmaps produced by decoders and consumed by the PNG writer and OCR.

use image::{DynamicImage, RgbImage};

use crate::error::{Error, Result};

/// An 8-bit interleaved bitmap with channel metadata.
///
/// Decoders return whatever color model the source uses; call
/// [`Bitmap::into_rgb`] to normalize to RGB before writing or OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Samples per pixel, including alpha
    pub channels: u8,

    /// Whether the last channel is alpha
    pub alpha: bool,

    /// Interleaved samples, row-major
    pub samples: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap, validating the sample buffer length.
    pub fn new(
        width: u32,
        height: u32,
        channels: u8,
        alpha: bool,
        samples: Vec<u8>,
    ) -> Result<Self> {
        if channels == 0 || (alpha && channels < 2) {
            return Err(Error::ImageExtract(format!(
                "invalid channel layout: {} channels, alpha={}",
                channels, alpha
            )));
        }

        let expected = width as usize * height as usize * channels as usize;
        if samples.len() != expected {
            return Err(Error::ImageExtract(format!(
                "sample buffer has {} bytes, expected {} for {}x{}x{}",
                samples.len(),
                expected,
                width,
                height,
                channels
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            alpha,
            samples,
        })
    }

    /// Create an RGB bitmap.
    pub fn rgb(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        Self::new(width, height, 3, false, samples)
    }

    /// Create a solid-color RGB bitmap.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let samples = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            channels: 3,
            alpha: false,
            samples,
        }
    }

    /// Number of color channels, excluding alpha.
    pub fn color_channels(&self) -> u8 {
        self.channels - u8::from(self.alpha)
    }

    /// Convert to an RGB image.
    ///
    /// Alpha is dropped. One color channel is treated as gray; four or more
    /// as CMYK, converted with `255 - min(255, c + k)` per component.
    pub fn into_rgb(self) -> Result<RgbImage> {
        if !self.alpha && self.channels == 3 {
            return RgbImage::from_raw(self.width, self.height, self.samples)
                .ok_or_else(|| Error::ImageExtract("RGB buffer size mismatch".to_string()));
        }

        let stride = self.channels as usize;
        let color = self.color_channels() as usize;
        let convert: fn(&[u8]) -> [u8; 3] = match color {
            1 => |c: &[u8]| [c[0], c[0], c[0]],
            3 => |c: &[u8]| [c[0], c[1], c[2]],
            n if n >= 4 => cmyk_to_rgb,
            n => {
                return Err(Error::ImageExtract(format!(
                    "unsupported color model with {} channels",
                    n
                )))
            }
        };

        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for pixel in self.samples.chunks_exact(stride) {
            out.extend_from_slice(&convert(&pixel[..color]));
        }

        RgbImage::from_raw(self.width, self.height, out)
            .ok_or_else(|| Error::ImageExtract("RGB buffer size mismatch".to_string()))
    }
}

fn cmyk_to_rgb(c: &[u8]) -> [u8; 3] {
    let k = c[3] as u16;
    let channel = |v: u8| 255 - (v as u16 + k).min(255) as u8;
    [channel(c[0]), channel(c[1]), channel(c[2])]
}

impl From<DynamicImage> for Bitmap {
    fn from(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (channels, alpha, samples) = match img {
            DynamicImage::ImageLuma8(buf) => (1, false, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, true, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, false, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, true, buf.into_raw()),
            other => (4, true, other.to_rgba8().into_raw()),
        };
        Self {
            width,
            height,
            channels,
            alpha,
            samples,
        }
    }
}

impl From<RgbImage> for Bitmap {
    fn from(img: RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            channels: 3,
            alpha: false,
            samples: img.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_short_buffer() {
        let result = Bitmap::new(2, 2, 3, false, vec![0; 11]);
        assert!(matches!(result, Err(Error::ImageExtract(_))));
    }

    #[test]
    fn test_rgb_passthrough() {
        let bmp = Bitmap::rgb(1, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let rgb = bmp.into_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 1).0, [4, 5, 6]);
    }

    #[test]
    fn test_alpha_is_stripped() {
        let bmp = Bitmap::new(1, 1, 4, true, vec![10, 20, 30, 0]).unwrap();
        assert_eq!(bmp.color_channels(), 3);
        let rgb = bmp.into_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_gray_with_alpha() {
        let bmp = Bitmap::new(1, 1, 2, true, vec![77, 255]).unwrap();
        let rgb = bmp.into_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [77, 77, 77]);
    }

    #[test]
    fn test_cmyk_converted() {
        // Pure cyan and full black
        let bmp = Bitmap::new(2, 1, 4, false, vec![255, 0, 0, 0, 0, 0, 0, 255]).unwrap();
        let rgb = bmp.into_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_two_color_channels_unsupported() {
        let bmp = Bitmap::new(1, 1, 2, false, vec![1, 2]).unwrap();
        assert!(bmp.into_rgb().is_err());
    }

    #[test]
    fn test_from_dynamic_rgba() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            2,
            image::Rgba([9, 8, 7, 6]),
        ));
        let bmp = Bitmap::from(img);
        assert_eq!((bmp.channels, bmp.alpha), (4, true));
        assert_eq!(bmp.samples.len(), 3 * 2 * 4);
    }

    #[test]
    fn test_filled() {
        let bmp = Bitmap::filled(2, 2, [255, 0, 0]);
        assert_eq!(bmp.samples, vec![255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 0]);
    }
}
