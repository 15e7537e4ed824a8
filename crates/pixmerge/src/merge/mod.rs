pub mod io;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use self::io::{FsImageIo, ImageIo};
use crate::buffer::PixelBuffer;
use crate::error::{MergeError, Result};
use crate::group::GroupSet;
use crate::locate::{CanvasSizing, Location, RegionLocator};
use crate::process::{DEFAULT_TOLERANCE, PixelEngine, RecordedPixels};

/// Outcome of folding one image into the output buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub file: PathBuf,
    /// Pixels the comparator reported as different.
    pub changed: u64,
    pub total: u64,
}

impl StepReport {
    pub fn changed_ratio(&self) -> f64 {
        if self.total > 0 {
            self.changed as f64 / self.total as f64
        } else {
            0.0
        }
    }

    pub fn same_ratio(&self) -> f64 {
        if self.total > 0 {
            1.0 - self.changed_ratio()
        } else {
            0.0
        }
    }
}

/// Called once per folded image.
pub type StepObserver = Box<dyn FnMut(&StepReport)>;

/// State restored after a non-persisting merge.
struct Snapshot {
    buffer: PixelBuffer,
    history_len: usize,
    recorded: Option<RecordedPixels>,
}

/// Folds images into one output buffer, one [`PixelEngine`] pass per image.
///
/// Starts empty; the first merged image becomes the seed buffer as-is.
/// `merge` and `merge_as` change the buffer durably, `export_merge` and
/// `test_merge` always leave it as they found it.
pub struct Merger<I: ImageIo = FsImageIo> {
    io: I,
    engine: PixelEngine,
    outfile: PathBuf,
    autosave: bool,
    canvas: CanvasSizing,
    locate_tolerance: u8,
    output: Option<PixelBuffer>,
    history: Vec<PathBuf>,
    observer: Option<StepObserver>,
}

impl<I: ImageIo> Merger<I> {
    pub fn with_io(outfile: impl Into<PathBuf>, io: I, engine: PixelEngine) -> Self {
        Self {
            io,
            engine,
            outfile: outfile.into(),
            autosave: false,
            canvas: CanvasSizing::default(),
            locate_tolerance: DEFAULT_TOLERANCE,
            output: None,
            history: Vec::new(),
            observer: None,
        }
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn with_canvas(mut self, canvas: CanvasSizing) -> Self {
        self.canvas = canvas;
        self
    }

    /// Per-channel tolerance used when matching borders in [`crop_find`](Self::crop_find).
    pub fn with_locate_tolerance(mut self, tolerance: u8) -> Self {
        self.locate_tolerance = tolerance;
        self
    }

    pub fn with_observer(mut self, observer: impl FnMut(&StepReport) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn outfile(&self) -> &Path {
        &self.outfile
    }

    pub fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    pub fn buffer(&self) -> Result<&PixelBuffer> {
        self.output.as_ref().ok_or(MergeError::NotInitialized)
    }

    /// Files folded in so far, seed first.
    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    pub fn engine(&self) -> &PixelEngine {
        &self.engine
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    /// Cluster the pixels the engine has recorded so far.
    pub fn groups(&self) -> GroupSet {
        self.engine.grouped()
    }

    /// Drop the output buffer, history and recorded pixels. Outfile, autosave
    /// and strategies are kept.
    pub fn reset(&mut self) {
        self.output = None;
        self.history.clear();
        self.engine.clear_recorded();
    }

    /// Fold `images` in order. An empty merger takes the first image as its
    /// seed. With autosave on, the buffer is saved once at the end.
    pub fn merge<P: AsRef<Path>>(&mut self, images: &[P]) -> Result<Vec<StepReport>> {
        let mut rest = images;
        if self.output.is_none() {
            let Some((first, tail)) = images.split_first() else {
                return Ok(Vec::new());
            };
            self.setup(first.as_ref())?;
            rest = tail;
        }

        let mut reports = Vec::with_capacity(rest.len());
        for image in rest {
            let report = self.fold(image.as_ref())?;
            if let Some(observer) = self.observer.as_mut() {
                observer(&report);
            }
            reports.push(report);
        }

        if self.autosave {
            self.save()?;
        }
        Ok(reports)
    }

    /// Switch the persistent output path, then [`merge`](Self::merge).
    pub fn merge_as<P: AsRef<Path>>(
        &mut self,
        outfile: impl Into<PathBuf>,
        images: &[P],
    ) -> Result<Vec<StepReport>> {
        self.outfile = outfile.into();
        self.merge(images)
    }

    /// Merge, write the result to `outfile` (or display it when `None`), then
    /// undo the merge. An empty merger goes back to empty. The merger's own
    /// outfile is never touched and autosave is suppressed for the duration.
    pub fn export_merge<P: AsRef<Path>>(
        &mut self,
        outfile: Option<&Path>,
        images: &[P],
    ) -> Result<Vec<StepReport>> {
        let snapshot = self.output.as_ref().map(|buffer| Snapshot {
            buffer: buffer.clone(),
            history_len: self.history.len(),
            recorded: self.engine.recorded().cloned(),
        });

        let autosave = std::mem::replace(&mut self.autosave, false);
        let merged = self.merge(images);
        self.autosave = autosave;

        let outcome = merged.and_then(|reports| {
            match outfile {
                Some(path) => self.save_to(path)?,
                None => self.show()?,
            }
            Ok(reports)
        });

        match snapshot {
            Some(snapshot) => self.restore(snapshot),
            None => self.reset(),
        }
        outcome
    }

    /// Preview a merge without keeping it.
    pub fn test_merge<P: AsRef<Path>>(&mut self, images: &[P]) -> Result<Vec<StepReport>> {
        self.export_merge(None, images)
    }

    /// Find `sub_image` inside the current buffer. When found, the sub-image is
    /// painted onto a fresh canvas (sized by the canvas policy), written to
    /// `outfile`, and that file is export-merged over the current buffer into
    /// `outfile`. The merger's own state is unchanged either way.
    ///
    /// A miss returns `Ok(None)` without writing or re-merging anything.
    pub fn crop_find(&mut self, outfile: &Path, sub_image: &Path) -> Result<Option<Location>> {
        let tracked = self.output.as_ref().ok_or(MergeError::NotInitialized)?;
        let sub = self.io.decode(sub_image)?;

        let locator = RegionLocator::with_tolerance(&sub, self.locate_tolerance);
        let Some(location) = locator.locate(tracked) else {
            return Ok(None);
        };

        let canvas = location.overlay(&sub, tracked.dimensions(), self.canvas);
        self.io.encode(&canvas, outfile)?;
        self.export_merge(Some(outfile), &[outfile])?;
        Ok(Some(location))
    }

    /// Persist the buffer to the merger's outfile.
    pub fn save(&mut self) -> Result<()> {
        let outfile = self.outfile.clone();
        self.save_to(&outfile)
    }

    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let buffer = self.output.as_ref().ok_or(MergeError::NotInitialized)?;
        self.io.encode(buffer, path)?;
        info!(path = %path.display(), "saved merge result");
        Ok(())
    }

    pub fn show(&mut self) -> Result<()> {
        let buffer = self.output.as_ref().ok_or(MergeError::NotInitialized)?;
        self.io.display(buffer)
    }

    fn setup(&mut self, seed: &Path) -> Result<()> {
        let buffer = self.io.decode(seed)?;
        debug!(
            seed = %seed.display(),
            width = buffer.width(),
            height = buffer.height(),
            "merger seeded"
        );
        self.output = Some(buffer);
        self.history.push(seed.to_path_buf());
        Ok(())
    }

    fn fold(&mut self, file: &Path) -> Result<StepReport> {
        let compare = self.io.decode(file)?;
        let output = self.output.as_mut().ok_or(MergeError::NotInitialized)?;
        let changed = self.engine.pass(output, &compare)?;
        let total = output.pixel_count();
        self.history.push(file.to_path_buf());

        debug!(file = %file.display(), changed, total, "merge step");
        Ok(StepReport {
            file: file.to_path_buf(),
            changed,
            total,
        })
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.output = Some(snapshot.buffer);
        self.history.truncate(snapshot.history_len);
        self.engine.replace_recorded(snapshot.recorded);
    }
}
