use std::collections::HashSet;
use std::fmt;

use image::RgbaImage;
use tracing::debug;

use crate::buffer::Pixel;
use crate::process::RecordedPixels;

/// Neighbour offsets for 8-connectivity.
const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One 8-connected cluster of recorded coordinates.
///
/// Pixel values are not stored here; they are looked up in the engine's
/// [`RecordedPixels`] map on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffGroup {
    points: Vec<(u32, u32)>,
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
}

impl DiffGroup {
    /// `points` must be non-empty.
    fn from_points(mut points: Vec<(u32, u32)>) -> Self {
        points.sort_unstable_by_key(|&(x, y)| (y, x));
        let (mut x_min, mut y_min) = (u32::MAX, u32::MAX);
        let (mut x_max, mut y_max) = (0, 0);
        for &(x, y) in &points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        Self {
            points,
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Member coordinates in row-major order.
    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    /// Inclusive `(x_min, y_min, x_max, y_max)`.
    pub fn bounds(&self) -> (u32, u32, u32, u32) {
        (self.x_min, self.y_min, self.x_max, self.y_max)
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Member coordinates paired with their recorded pixel values.
    pub fn pixels<'a>(
        &'a self,
        recorded: &'a RecordedPixels,
    ) -> impl Iterator<Item = ((u32, u32), Pixel)> + 'a {
        self.points
            .iter()
            .filter_map(|p| recorded.get(p).map(|pixel| (*p, *pixel)))
    }

    /// Paint the group onto a transparent canvas the size of its bounding box.
    pub fn render(&self, recorded: &RecordedPixels) -> RgbaImage {
        let mut canvas = RgbaImage::new(self.width(), self.height());
        for ((x, y), pixel) in self.pixels(recorded) {
            canvas.put_pixel(x - self.x_min, y - self.y_min, pixel);
        }
        canvas
    }
}

impl fmt::Display for DiffGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pixels at ({}, {}) spanning {}x{}",
            self.len(),
            self.x_min,
            self.y_min,
            self.width(),
            self.height()
        )
    }
}

/// Ordered collection of disjoint [`DiffGroup`]s.
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    groups: Vec<DiffGroup>,
}

impl GroupSet {
    /// Flood-fill the recorded coordinates into 8-connected groups.
    /// Seeds are taken in row-major order, so the initial order is stable.
    pub fn from_recorded(recorded: &RecordedPixels) -> Self {
        let mut seeds: Vec<(u32, u32)> = recorded.keys().copied().collect();
        seeds.sort_unstable_by_key(|&(x, y)| (y, x));

        let mut visited: HashSet<(u32, u32)> = HashSet::with_capacity(seeds.len());
        let mut groups = Vec::new();

        for seed in seeds {
            if !visited.insert(seed) {
                continue;
            }
            let mut members = Vec::new();
            let mut stack = vec![seed];
            while let Some(current) = stack.pop() {
                members.push(current);
                for next in neighbours(current) {
                    if recorded.contains_key(&next) && visited.insert(next) {
                        stack.push(next);
                    }
                }
            }
            groups.push(DiffGroup::from_points(members));
        }

        debug!(pixels = recorded.len(), groups = groups.len(), "grouped recorded pixels");
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total member count across all groups.
    pub fn pixel_count(&self) -> usize {
        self.groups.iter().map(DiffGroup::len).sum()
    }

    /// Largest groups first. Equal-sized groups keep their relative order.
    pub fn sort_count(&mut self) {
        self.groups.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    /// Drop groups with fewer than `min_size` members.
    pub fn filter(&mut self, min_size: usize) {
        self.groups.retain(|g| g.len() >= min_size);
    }

    /// Lazy walk over the groups in their current order. Call again to restart.
    pub fn iter(&self) -> std::slice::Iter<'_, DiffGroup> {
        self.groups.iter()
    }

    pub fn first(&self) -> Option<&DiffGroup> {
        self.groups.first()
    }

    /// Group with the most members; the earliest wins a tie.
    pub fn largest(&self) -> Option<&DiffGroup> {
        self.groups
            .iter()
            .reduce(|best, g| if g.len() > best.len() { g } else { best })
    }
}

impl<'a> IntoIterator for &'a GroupSet {
    type Item = &'a DiffGroup;
    type IntoIter = std::slice::Iter<'a, DiffGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn neighbours((x, y): (u32, u32)) -> impl Iterator<Item = (u32, u32)> {
    NEIGHBOURS.iter().filter_map(move |&(dx, dy)| {
        let nx = u32::try_from(x as i64 + dx).ok()?;
        let ny = u32::try_from(y as i64 + dy).ok()?;
        Some((nx, ny))
    })
}
