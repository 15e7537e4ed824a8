use image::{Rgba, RgbaImage};

use crate::error::{MergeError, Result};

/// A single RGBA sample, 0–255 per channel.
pub type Pixel = Rgba<u8>;

/// Addressable 2D grid of RGBA pixels.
///
/// Every accessor is bounds-checked: coordinates outside the grid produce
/// [`MergeError::OutOfBounds`] instead of being clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn from_pixel(width: u32, height: u32, pixel: Pixel) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, pixel),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel_count(&self) -> u64 {
        (self.width() as u64) * (self.height() as u64)
    }

    pub fn get(&self, x: u32, y: u32) -> Result<Pixel> {
        self.check(x, y)?;
        Ok(*self.image.get_pixel(x, y))
    }

    pub fn put(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<()> {
        self.check(x, y)?;
        self.image.put_pixel(x, y, pixel);
        Ok(())
    }

    /// Pixels of row `y`, left to right.
    pub fn row(&self, y: u32) -> Result<Vec<Pixel>> {
        if y >= self.height() {
            return Err(self.out_of_bounds(0, y));
        }
        Ok((0..self.width())
            .map(|x| *self.image.get_pixel(x, y))
            .collect())
    }

    pub fn ensure_same_size(&self, other: &PixelBuffer) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(MergeError::DimensionMismatch {
                expected_w: self.width(),
                expected_h: self.height(),
                actual_w: other.width(),
                actual_h: other.height(),
            });
        }
        Ok(())
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    fn check(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width() || y >= self.height() {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(())
    }

    fn out_of_bounds(&self, x: u32, y: u32) -> MergeError {
        MergeError::OutOfBounds {
            x,
            y,
            width: self.width(),
            height: self.height(),
        }
    }
}
