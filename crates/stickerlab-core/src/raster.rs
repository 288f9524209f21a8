//! The raster image value owned by an editing session.
//!
//! A [`Raster`] is an immutable-by-convention RGB bitmap at native
//! resolution. Crop and pad never mutate one in place; they produce a new
//! value that replaces the session's image. The compositor works on a
//! cloned canvas for the same reason.

use crate::geometry::Size;
use crate::Color;

/// An RGB raster with native pixel dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a new Raster with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 3) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Raster filled with a solid color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Raster from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for further processing or encoding.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Pixel dimensions as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Read the color at (x, y). Caller must stay in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 3) as usize;
        Color::new(self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
    }

    /// Write the color at (x, y). Caller must stay in bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        let idx = ((y * self.width + x) * 3) as usize;
        self.pixels[idx] = color.r;
        self.pixels[idx + 1] = color.g;
        self.pixels[idx + 2] = color.b;
    }

    /// Blend `color` over the pixel at (x, y) with the given coverage in
    /// [0, 1]. Out-of-bounds coordinates are ignored, so rasterizers can
    /// stamp across the canvas edge without clipping themselves.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let cov = coverage.clamp(0.0, 1.0);
        if cov <= 0.0 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 3) as usize;
        for (c, src) in [color.r, color.g, color.b].into_iter().enumerate() {
            let dst = f32::from(self.pixels[idx + c]);
            self.pixels[idx + c] = (f32::from(src) * cov + dst * (1.0 - cov)).round() as u8;
        }
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
