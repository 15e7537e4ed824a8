use super::{DEFAULT_TOLERANCE, PixelComparator};
use crate::buffer::Pixel;

/// Channel-wise color comparison.
///
/// A channel is out of tolerance when it differs by more than `tolerance`.
/// The pixel pair differs once more than `max_channel_diffs` channels are out
/// of tolerance; the scan stops at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDiff {
    tolerance: u8,
    max_channel_diffs: usize,
}

impl Default for ColorDiff {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_channel_diffs: 0,
        }
    }
}

impl ColorDiff {
    pub fn new(tolerance: u8, max_channel_diffs: usize) -> Self {
        Self {
            tolerance,
            max_channel_diffs,
        }
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    pub fn max_channel_diffs(&self) -> usize {
        self.max_channel_diffs
    }
}

impl PixelComparator for ColorDiff {
    fn differs(&self, base: &Pixel, compare: &Pixel) -> bool {
        let mut out_of_tolerance = 0usize;
        for (l, r) in base.0.iter().zip(compare.0.iter()) {
            if l.abs_diff(*r) > self.tolerance {
                out_of_tolerance += 1;
                if out_of_tolerance > self.max_channel_diffs {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn default_tolerance_boundary() {
        let cmp = ColorDiff::default();
        let base = Rgba([50, 60, 70, 255]);
        assert!(!cmp.differs(&base, &Rgba([55, 55, 75, 250])));
        assert!(cmp.differs(&base, &Rgba([56, 60, 70, 255])));
        assert!(cmp.differs(&base, &Rgba([50, 60, 64, 255])));
    }

    #[test]
    fn identical_pixels_never_differ() {
        let cmp = ColorDiff::new(0, 0);
        let p = Rgba([1, 2, 3, 4]);
        assert!(!cmp.differs(&p, &p));
    }

    #[test]
    fn channel_budget_allows_partial_mismatch() {
        let cmp = ColorDiff::new(5, 1);
        assert_eq!(cmp.max_channel_diffs(), 1);
        let base = Rgba([0, 0, 0, 255]);
        // One channel out of tolerance is within the budget.
        assert!(!cmp.differs(&base, &Rgba([200, 0, 0, 255])));
        // Two are not.
        assert!(cmp.differs(&base, &Rgba([200, 200, 0, 255])));
    }

    #[test]
    fn custom_tolerance() {
        let cmp = ColorDiff::new(20, 0);
        assert_eq!(cmp.tolerance(), 20);
        let base = Rgba([100, 100, 100, 255]);
        assert!(!cmp.differs(&base, &Rgba([120, 80, 100, 255])));
        assert!(cmp.differs(&base, &Rgba([121, 100, 100, 255])));
    }
}
