pub mod buffer;
pub mod error;
pub mod group;
pub mod locate;
pub mod merge;
pub mod process;

pub use self::buffer::{Pixel, PixelBuffer};
pub use self::error::{MergeError, Result};
pub use self::group::{DiffGroup, GroupSet};
pub use self::locate::{CanvasSizing, Location, Orientation, RegionLocator};
pub use self::merge::io::{FsImageIo, ImageIo, convert_to_rgba};
pub use self::merge::{Merger, StepReport};
pub use self::process::{
    ColorDiff, DEFAULT_TOLERANCE, Highlight, PixelActor, PixelComparator, PixelEngine,
    RecordedPixels, TakeNonEmptySecond,
};
