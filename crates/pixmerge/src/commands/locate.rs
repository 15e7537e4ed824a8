use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use pixmerge::{CanvasSizing, Location, MergeError};

use crate::config::ResolvedConfig;
use crate::report::{self, terminal};

#[derive(Serialize)]
struct LocateReport<'a> {
    sub: &'a Path,
    found: Option<Location>,
    outfile: Option<&'a Path>,
}

/// `pixmerge locate`: find `sub` inside `tracked` and write the overlay.
/// Returns exit code: 0 = found, 1 = not found.
pub fn locate(
    config: &ResolvedConfig,
    tracked: &Path,
    sub: &Path,
    outfile: &Path,
    json: bool,
) -> Result<i32> {
    let mut merger = config.merger(false);
    merger
        .merge(&[tracked])
        .with_context(|| format!("Failed to load {}", tracked.display()))?;

    let found = match merger.crop_find(outfile, sub) {
        Ok(found) => found,
        Err(e) => {
            if let Some(hint) = canvas_hint(&e, config.canvas) {
                terminal::print_hint(hint);
            }
            return Err(e).with_context(|| format!("Failed to locate {}", sub.display()));
        }
    };

    if json {
        report::print_json(&LocateReport {
            sub,
            found,
            outfile: found.map(|_| outfile),
        })?;
    } else {
        terminal::print_location(sub, found.as_ref());
        if found.is_some() {
            println!("Overlay written to {}", outfile.display());
        }
    }

    Ok(if found.is_some() { 0 } else { 1 })
}

/// The square canvas cannot be merged back into a non-square tracked image.
fn canvas_hint(err: &MergeError, canvas: CanvasSizing) -> Option<&'static str> {
    match (err, canvas) {
        (MergeError::DimensionMismatch { .. }, CanvasSizing::SquareFromWidth) => Some(
            "the square-from-width canvas only fits square images, retry with --canvas tracked-extent",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch() -> MergeError {
        MergeError::DimensionMismatch {
            expected_w: 40,
            expected_h: 30,
            actual_w: 40,
            actual_h: 40,
        }
    }

    #[test]
    fn square_canvas_mismatch_suggests_tracked_extent() {
        let hint = canvas_hint(&mismatch(), CanvasSizing::SquareFromWidth).unwrap();
        assert!(hint.contains("--canvas tracked-extent"));
    }

    #[test]
    fn no_hint_for_other_errors_or_policies() {
        assert!(canvas_hint(&mismatch(), CanvasSizing::TrackedExtent).is_none());
        assert!(canvas_hint(&MergeError::NotInitialized, CanvasSizing::SquareFromWidth).is_none());
    }
}
