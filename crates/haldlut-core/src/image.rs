//! Image representation for the LUT pipeline.

use std::path::Path;

use crate::error::LutError;

/// 8-bit RGBA image, row-major with a top-left origin.
///
/// Images are never mutated once built; every pipeline stage returns a new
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Image {
    /// Build an image from an RGBA pixel buffer.
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self, LutError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(LutError::PixelCount {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Caller guarantees `pixels.len() == width * height`.
    pub(crate) fn from_raw_parts(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image filled with a single color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgba; width as usize * height as usize],
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel data in RGBA order.
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Raw RGBA bytes, four per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Consume the image and return its pixel buffer.
    pub fn into_pixels(self) -> Vec<[u8; 4]> {
        self.pixels
    }

    // ── Decode collaborator ─────────────────────────────────────────

    /// Decode an encoded image (PNG, JPEG) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, LutError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_rgba_image(img.to_rgba8()))
    }

    /// Load and decode an image from disk.
    pub fn open(path: &Path) -> Result<Self, LutError> {
        let img = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        Ok(Self::from_rgba_image(img.to_rgba8()))
    }

    /// Encode the image to disk; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), LutError> {
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
        if is_jpeg {
            // JPEG has no alpha channel.
            image::DynamicImage::ImageRgba8(self.to_rgba_image())
                .to_rgb8()
                .save(path)?;
        } else {
            self.to_rgba_image().save(path)?;
        }
        Ok(())
    }

    /// Convert from an `image` crate buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.pixels().map(|p| p.0).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert into an `image` crate buffer.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.pixels[y as usize * self.width as usize + x as usize])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_pixel_count() {
        let err = Image::new(2, 2, vec![[0; 4]; 3]).unwrap_err();
        assert!(matches!(
            err,
            LutError::PixelCount {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let img = Image::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
        assert_eq!(img.pixels()[4], [1, 1, 0, 255]);
        assert_eq!(img.pixel(2, 1), Some([2, 1, 0, 255]));
        assert_eq!(img.pixel(3, 0), None);
    }

    #[test]
    fn test_as_bytes_is_rgba_order() {
        let img = Image::filled(1, 1, [10, 20, 30, 40]);
        assert_eq!(img.as_bytes(), &[10, 20, 30, 40]);
    }

    #[test]
    fn test_rgba_image_conversion_keeps_layout() {
        let img = Image::from_fn(4, 3, |x, y| [x as u8 * 10, y as u8 * 20, 7, 200]);
        let back = Image::from_rgba_image(img.to_rgba_image());
        assert_eq!(back, img);
    }

    #[test]
    fn test_png_save_and_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gradient.png");
        let img = Image::from_fn(5, 5, |x, y| [x as u8 * 50, y as u8 * 50, 128, 255]);
        img.save(&path).expect("save png");
        let loaded = Image::open(&path).expect("open png");
        assert_eq!(loaded, img);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = Image::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, LutError::Decode(_)));
    }
}
