pub mod actor;
pub mod comparator;
pub mod engine;

use crate::buffer::Pixel;

pub use self::actor::{HIGHLIGHT_RED, Highlight, TakeNonEmptySecond};
pub use self::comparator::ColorDiff;
pub use self::engine::{PixelEngine, RecordedPixels};

/// Per-channel slack that absorbs lossy re-encoding noise between saves.
pub const DEFAULT_TOLERANCE: u8 = 5;

/// Decides whether two same-coordinate pixels differ enough to act on.
pub trait PixelComparator {
    fn differs(&self, base: &Pixel, compare: &Pixel) -> bool;
}

/// Computes the output pixel for a base/compare pair and the comparator verdict.
pub trait PixelActor {
    fn act(&self, base: &Pixel, compare: &Pixel, differs: bool) -> Pixel;
}

/// True when every channel of `a` and `b` is at most `tolerance` apart.
pub fn within_tolerance(a: &Pixel, b: &Pixel, tolerance: u8) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(l, r)| l.abs_diff(*r) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn five_apart_is_equal_six_is_not() {
        let base = Rgba([100, 100, 100, 255]);
        assert!(within_tolerance(&base, &Rgba([105, 95, 105, 250]), 5));
        assert!(!within_tolerance(&base, &Rgba([106, 100, 100, 255]), 5));
        assert!(!within_tolerance(&base, &Rgba([100, 100, 100, 249]), 5));
    }
}
