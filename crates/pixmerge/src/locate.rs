use image::RgbaImage;
use image::imageops;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::{Pixel, PixelBuffer};
use crate::process::{DEFAULT_TOLERANCE, within_tolerance};

/// How the sub-image appears inside the tracked buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// As cropped.
    Upright,
    /// Turned 90° counter-clockwise: the right column is on top.
    Rotated90,
    /// Turned 180°: the bottom row, reversed, is on top.
    Rotated180,
    /// Turned 90° clockwise: the left column, read upwards, is on top.
    Rotated270,
}

impl Orientation {
    pub fn degrees(self) -> u32 {
        match self {
            Self::Upright => 0,
            Self::Rotated90 => 90,
            Self::Rotated180 => 180,
            Self::Rotated270 => 270,
        }
    }

    /// Footprint of a `w x h` sub-image once placed in this orientation.
    pub fn placed_dimensions(self, w: u32, h: u32) -> (u32, u32) {
        match self {
            Self::Upright | Self::Rotated180 => (w, h),
            Self::Rotated90 | Self::Rotated270 => (h, w),
        }
    }

    /// Turn `image` the way it appears in the tracked buffer.
    pub fn apply(self, image: &RgbaImage) -> RgbaImage {
        match self {
            Self::Upright => image.clone(),
            Self::Rotated90 => imageops::rotate270(image),
            Self::Rotated180 => imageops::rotate180(image),
            Self::Rotated270 => imageops::rotate90(image),
        }
    }
}

/// Size of the canvas a located region is painted onto.
///
/// `SquareFromWidth` reproduces the historical behaviour of sizing the canvas
/// from the tracked width alone; for non-square tracked buffers the canvas
/// then cannot be merged back. `TrackedExtent` uses the full tracked size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasSizing {
    #[default]
    SquareFromWidth,
    TrackedExtent,
}

impl CanvasSizing {
    pub fn canvas_dimensions(self, (w, h): (u32, u32)) -> (u32, u32) {
        match self {
            Self::SquareFromWidth => (w, w),
            Self::TrackedExtent => (w, h),
        }
    }
}

/// Anchor (top-left corner of the placement) and orientation of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
}

impl Location {
    /// Paint `sub`, turned into the matched orientation, onto a fresh
    /// transparent canvas sized from `tracked` by `sizing`.
    pub fn overlay(
        &self,
        sub: &PixelBuffer,
        tracked: (u32, u32),
        sizing: CanvasSizing,
    ) -> PixelBuffer {
        let (w, h) = sizing.canvas_dimensions(tracked);
        let mut canvas = RgbaImage::new(w, h);
        let placed = self.orientation.apply(sub.as_image());
        imageops::replace(&mut canvas, &placed, self.x as i64, self.y as i64);
        PixelBuffer::from_image(canvas)
    }
}

/// Per-border verdicts for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PairMatch {
    first: bool,
    second: bool,
}

/// Searches a tracked buffer for a sub-image by its borders.
///
/// Borders are walked clockwise: top (left→right), right (top→bottom),
/// bottom (right→left), left (bottom→top). A quarter turn shifts which border
/// ends up on top, so matching one row strip against all four covers every
/// rotation.
pub struct RegionLocator {
    width: u32,
    height: u32,
    top: Vec<Pixel>,
    right: Vec<Pixel>,
    bottom: Vec<Pixel>,
    left: Vec<Pixel>,
    tolerance: u8,
}

impl RegionLocator {
    pub fn new(sub: &PixelBuffer) -> Self {
        Self::with_tolerance(sub, DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(sub: &PixelBuffer, tolerance: u8) -> Self {
        let img = sub.as_image();
        let (w, h) = img.dimensions();
        let (last_x, last_y) = (w.saturating_sub(1), h.saturating_sub(1));

        let (top, bottom, right, left) = if w == 0 || h == 0 {
            Default::default()
        } else {
            (
                (0..w).map(|x| *img.get_pixel(x, 0)).collect(),
                (0..w).rev().map(|x| *img.get_pixel(x, last_y)).collect(),
                (0..h).map(|y| *img.get_pixel(last_x, y)).collect(),
                (0..h).rev().map(|y| *img.get_pixel(0, y)).collect(),
            )
        };

        Self {
            width: w,
            height: h,
            top,
            right,
            bottom,
            left,
            tolerance,
        }
    }

    /// First placement in row-major order (lowest y, then lowest x) whose top
    /// strip matches one of the borders, or `None`.
    ///
    /// At a single position the orientations are tried in the order
    /// `Upright`, `Rotated180`, `Rotated90`, `Rotated270`. A placement must
    /// fit entirely inside the tracked buffer.
    pub fn locate(&self, tracked: &PixelBuffer) -> Option<Location> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let (tw, th) = tracked.dimensions();
        let (w, h) = (self.width as usize, self.height as usize);

        for y in 0..th {
            // Rows are always in range here.
            let row = tracked.row(y).ok()?;
            let fits = |o: Orientation| y + o.placed_dimensions(self.width, self.height).1 <= th;
            let fits_upright = fits(Orientation::Upright);
            let fits_turned = fits(Orientation::Rotated90);

            for x in 0..tw as usize {
                if fits_upright && let Some(window) = row.get(x..x + w) {
                    let m = self.compare_pair(&self.top, &self.bottom, window);
                    if let Some(o) = pick(m, Orientation::Upright, Orientation::Rotated180) {
                        return Some(self.found(x, y, o));
                    }
                }
                if fits_turned && let Some(window) = row.get(x..x + h) {
                    let m = self.compare_pair(&self.right, &self.left, window);
                    if let Some(o) = pick(m, Orientation::Rotated90, Orientation::Rotated270) {
                        return Some(self.found(x, y, o));
                    }
                }
            }
        }

        debug!(
            sub_w = self.width,
            sub_h = self.height,
            tracked_w = tw,
            tracked_h = th,
            "sub-image not found"
        );
        None
    }

    fn found(&self, x: usize, y: u32, orientation: Orientation) -> Location {
        let location = Location {
            x: x as u32,
            y,
            orientation,
        };
        debug!(x = location.x, y, degrees = orientation.degrees(), "sub-image located");
        location
    }

    /// Match `window` against two borders at once, dropping out as soon as
    /// neither can still match.
    fn compare_pair(&self, first: &[Pixel], second: &[Pixel], window: &[Pixel]) -> PairMatch {
        let mut m = PairMatch {
            first: true,
            second: true,
        };
        for ((a, b), p) in first.iter().zip(second).zip(window) {
            m.first = m.first && within_tolerance(a, p, self.tolerance);
            m.second = m.second && within_tolerance(b, p, self.tolerance);
            if !m.first && !m.second {
                break;
            }
        }
        m
    }
}

fn pick(m: PairMatch, first: Orientation, second: Orientation) -> Option<Orientation> {
    match (m.first, m.second) {
        (true, _) => Some(first),
        (false, true) => Some(second),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Deterministic pseudo-random opaque pixel, so no two strips look alike.
    fn noise(x: u32, y: u32) -> Pixel {
        let mut h = x.wrapping_mul(0x9E37_79B9) ^ y.wrapping_mul(0x85EB_CA6B);
        h ^= h >> 15;
        h = h.wrapping_mul(0x2C1B_3C6D);
        h ^= h >> 12;
        h = h.wrapping_mul(0x297A_2D39);
        h ^= h >> 15;
        let [r, g, b, _] = h.to_le_bytes();
        Rgba([r, g, b, 255])
    }

    fn tracked(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_image(RgbaImage::from_fn(w, h, noise))
    }

    fn crop(buf: &PixelBuffer, x: u32, y: u32, w: u32, h: u32) -> RgbaImage {
        imageops::crop_imm(buf.as_image(), x, y, w, h).to_image()
    }

    // -- orientation --

    #[test]
    fn upright_crop_is_found_at_its_origin() {
        let t = tracked(40, 30);
        let sub = PixelBuffer::from_image(crop(&t, 10, 12, 8, 5));
        let found = RegionLocator::new(&sub).locate(&t);
        assert_eq!(
            found,
            Some(Location {
                x: 10,
                y: 12,
                orientation: Orientation::Upright
            })
        );
    }

    #[test]
    fn quarter_turns_report_matching_orientation() {
        let t = tracked(40, 30);
        let c = crop(&t, 10, 12, 8, 5);
        let cases = [
            (imageops::rotate90(&c), Orientation::Rotated90),
            (imageops::rotate180(&c), Orientation::Rotated180),
            (imageops::rotate270(&c), Orientation::Rotated270),
        ];
        for (turned, expected) in cases {
            let sub = PixelBuffer::from_image(turned);
            let found = RegionLocator::new(&sub).locate(&t).unwrap();
            assert_eq!((found.x, found.y), (10, 12), "{expected:?}");
            assert_eq!(found.orientation, expected);
        }
    }

    #[test]
    fn applying_orientation_restores_the_crop() {
        let t = tracked(40, 30);
        let c = crop(&t, 3, 4, 6, 9);
        for (turned, orientation) in [
            (c.clone(), Orientation::Upright),
            (imageops::rotate90(&c), Orientation::Rotated90),
            (imageops::rotate180(&c), Orientation::Rotated180),
            (imageops::rotate270(&c), Orientation::Rotated270),
        ] {
            assert_eq!(orientation.apply(&turned), c, "{orientation:?}");
        }
    }

    #[test]
    fn match_survives_small_channel_noise() {
        let t = tracked(32, 32);
        let mut c = crop(&t, 5, 20, 7, 4);
        for p in c.pixels_mut() {
            p[0] = p[0].saturating_add(3);
            p[2] = p[2].saturating_sub(4);
        }
        let found = RegionLocator::new(&PixelBuffer::from_image(c)).locate(&t);
        assert_eq!(found.map(|l| (l.x, l.y)), Some((5, 20)));
    }

    // -- negative results --

    #[test]
    fn absent_sub_image_is_not_found() {
        let t = tracked(32, 24);
        let sub = PixelBuffer::from_pixel(6, 4, Rgba([255, 0, 255, 255]));
        assert_eq!(RegionLocator::new(&sub).locate(&t), None);
    }

    #[test]
    fn sub_image_larger_than_tracked_is_not_found() {
        let t = tracked(8, 8);
        let sub = PixelBuffer::from_image(RgbaImage::from_fn(12, 3, noise));
        assert_eq!(RegionLocator::new(&sub).locate(&t), None);
    }

    #[test]
    fn placement_must_fit_vertically() {
        // The top row of the crop sits in the last row of the buffer, so the
        // 3-tall placement would hang off the bottom.
        let t = tracked(20, 10);
        let strip = crop(&t, 4, 9, 6, 1);
        let mut sub = RgbaImage::from_pixel(6, 3, Rgba([0, 0, 0, 255]));
        imageops::replace(&mut sub, &strip, 0, 0);
        let found = RegionLocator::new(&PixelBuffer::from_image(sub)).locate(&t);
        assert_eq!(found, None);
    }

    #[test]
    fn empty_sub_image_is_not_found() {
        let t = tracked(8, 8);
        assert_eq!(RegionLocator::new(&PixelBuffer::new(0, 0)).locate(&t), None);
    }

    // -- canvas --

    #[test]
    fn canvas_sizing_policies() {
        assert_eq!(
            CanvasSizing::SquareFromWidth.canvas_dimensions((40, 30)),
            (40, 40)
        );
        assert_eq!(
            CanvasSizing::TrackedExtent.canvas_dimensions((40, 30)),
            (40, 30)
        );
    }

    #[test]
    fn overlay_paints_turned_sub_image_at_anchor() {
        let t = tracked(30, 30);
        let c = crop(&t, 12, 7, 5, 8);
        let sub = PixelBuffer::from_image(imageops::rotate90(&c));
        let location = RegionLocator::new(&sub).locate(&t).unwrap();

        let canvas = location.overlay(&sub, t.dimensions(), CanvasSizing::TrackedExtent);
        assert_eq!(canvas.dimensions(), (30, 30));
        assert_eq!(crop(&canvas, 12, 7, 5, 8), c);
        assert_eq!(canvas.get(0, 0).unwrap()[3], 0);
        assert_eq!(canvas.get(29, 29).unwrap()[3], 0);
    }
}
