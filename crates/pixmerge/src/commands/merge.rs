use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::report::{self, terminal};

/// `pixmerge merge`: seed with the first image, fold the rest, save.
pub fn merge(config: &ResolvedConfig, images: &[PathBuf], json: bool) -> Result<()> {
    let start = Instant::now();
    let mut merger = config.merger(false);
    if !json {
        merger = merger.with_observer(terminal::print_step);
    }

    debug!(count = images.len(), outfile = %config.outfile.display(), "merging");
    let reports = merger.merge(images).context("Merge failed")?;

    // Autosave already wrote the result.
    if !merger.autosave() {
        merger.save().context("Failed to save merge result")?;
    }

    if json {
        return report::print_json(&reports);
    }

    let buffer = merger.buffer()?;
    terminal::print_seeded(&images[0], buffer.width(), buffer.height());
    terminal::print_summary(&reports, start.elapsed(), Some(merger.outfile()));
    Ok(())
}
