use std::collections::HashMap;

use super::{ColorDiff, PixelActor, PixelComparator, TakeNonEmptySecond};
use crate::buffer::{Pixel, PixelBuffer};
use crate::error::Result;
use crate::group::GroupSet;

/// Output pixels at the coordinates where the comparator reported a difference.
pub type RecordedPixels = HashMap<(u32, u32), Pixel>;

/// Drives a comparator/actor pair across a pair of buffers.
///
/// Buffers are bound per call: the output is updated in place, the compare
/// buffer is only read. When recording is enabled, every differing coordinate
/// is remembered with the pixel the actor wrote there; records accumulate
/// across passes until [`PixelEngine::clear_recorded`].
pub struct PixelEngine {
    comparator: Box<dyn PixelComparator>,
    actor: Box<dyn PixelActor>,
    recorded: Option<RecordedPixels>,
}

impl Default for PixelEngine {
    fn default() -> Self {
        Self::new(ColorDiff::default(), TakeNonEmptySecond)
    }
}

impl PixelEngine {
    pub fn new(
        comparator: impl PixelComparator + 'static,
        actor: impl PixelActor + 'static,
    ) -> Self {
        Self::from_boxed(Box::new(comparator), Box::new(actor))
    }

    pub fn from_boxed(comparator: Box<dyn PixelComparator>, actor: Box<dyn PixelActor>) -> Self {
        Self {
            comparator,
            actor,
            recorded: None,
        }
    }

    /// Enable recording of differing pixels.
    pub fn recording(mut self) -> Self {
        self.recorded.get_or_insert_with(HashMap::new);
        self
    }

    pub fn is_recording(&self) -> bool {
        self.recorded.is_some()
    }

    pub fn recorded(&self) -> Option<&RecordedPixels> {
        self.recorded.as_ref()
    }

    pub fn clear_recorded(&mut self) {
        if let Some(recorded) = self.recorded.as_mut() {
            recorded.clear();
        }
    }

    pub(crate) fn replace_recorded(&mut self, recorded: Option<RecordedPixels>) {
        self.recorded = recorded;
    }

    /// Process one coordinate. Returns 1 if the pair differed, else 0.
    pub fn run(
        &mut self,
        output: &mut PixelBuffer,
        compare: &PixelBuffer,
        x: u32,
        y: u32,
    ) -> Result<u32> {
        let base = output.get(x, y)?;
        let other = compare.get(x, y)?;

        let differs = self.comparator.differs(&base, &other);
        let result = self.actor.act(&base, &other, differs);
        output.put(x, y, result)?;

        if !differs {
            return Ok(0);
        }
        if let Some(recorded) = self.recorded.as_mut() {
            recorded.insert((x, y), result);
        }
        Ok(1)
    }

    /// Full-frame pass over the output extent. Returns the change count.
    pub fn pass(&mut self, output: &mut PixelBuffer, compare: &PixelBuffer) -> Result<u64> {
        output.ensure_same_size(compare)?;

        let (w, h) = output.dimensions();
        let mut changed = 0u64;
        for y in 0..h {
            for x in 0..w {
                changed += self.run(output, compare, x, y)? as u64;
            }
        }
        Ok(changed)
    }

    /// Cluster the recorded pixels. Empty when recording is off.
    pub fn grouped(&self) -> GroupSet {
        self.recorded
            .as_ref()
            .map(GroupSet::from_recorded)
            .unwrap_or_default()
    }
}
