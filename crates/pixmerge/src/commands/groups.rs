use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use pixmerge::{FsImageIo, ImageIo, PixelBuffer};

use crate::config::ResolvedConfig;
use crate::report::{self, terminal};

/// `pixmerge groups`: merge with recording on, cluster the changed pixels,
/// report the groups largest first.
pub fn groups(
    config: &ResolvedConfig,
    images: &[PathBuf],
    first: Option<&Path>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let mut merger = config.merger(true);
    merger.merge(images).context("Merge failed")?;

    let mut groups = merger.groups();
    groups.sort_count();
    groups.filter(config.min_size);

    if let Some(path) = first {
        let recorded = merger
            .engine()
            .recorded()
            .context("Engine is not recording")?;
        match groups.first() {
            Some(group) => {
                let image = PixelBuffer::from_image(group.render(recorded));
                FsImageIo::default()
                    .encode(&image, path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), pixels = group.len(), "wrote largest group");
            }
            None => println!("No group with at least {} pixel(s)", config.min_size),
        }
    }

    if json {
        return report::print_json(&report::group_summaries(&groups));
    }
    terminal::print_groups(&groups, limit);
    Ok(())
}
