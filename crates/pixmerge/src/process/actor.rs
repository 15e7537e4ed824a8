use image::Rgba;

use super::PixelActor;
use crate::buffer::Pixel;

pub const HIGHLIGHT_RED: Pixel = Rgba([255, 0, 0, 255]);

/// Folds new content in: a differing, non-transparent compare pixel replaces
/// the base pixel. Transparent compare pixels never overwrite anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct TakeNonEmptySecond;

impl PixelActor for TakeNonEmptySecond {
    fn act(&self, base: &Pixel, compare: &Pixel, differs: bool) -> Pixel {
        if differs && compare[3] != 0 {
            *compare
        } else {
            *base
        }
    }
}

/// Paints differing positions with a fixed color and keeps the base elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct Highlight {
    color: Pixel,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            color: HIGHLIGHT_RED,
        }
    }
}

impl Highlight {
    pub fn new(color: Pixel) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Pixel {
        self.color
    }
}

impl PixelActor for Highlight {
    fn act(&self, base: &Pixel, _compare: &Pixel, differs: bool) -> Pixel {
        if differs { self.color } else { *base }
    }
}
