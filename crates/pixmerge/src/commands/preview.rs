use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ResolvedConfig;
use crate::report::terminal;

/// `pixmerge preview`: merge onto `base` without keeping the result.
/// Writes to `export` when given, otherwise opens a temporary preview.
pub fn preview(
    config: &ResolvedConfig,
    base: &Path,
    images: &[PathBuf],
    export: Option<&Path>,
) -> Result<()> {
    let mut merger = config.merger(false);
    merger
        .merge(&[base])
        .with_context(|| format!("Failed to load {}", base.display()))?;

    let reports = merger
        .export_merge(export, images)
        .context("Preview merge failed")?;
    for r in &reports {
        terminal::print_step(r);
    }

    if let Some(path) = export {
        println!("Preview written to {}", path.display());
    }
    Ok(())
}
