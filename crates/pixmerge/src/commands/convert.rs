use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pixmerge::{FsImageIo, convert_to_rgba};

/// `pixmerge convert`: re-encode every image as an RGBA PNG under `dir`.
pub fn convert(images: &[PathBuf], dir: &Path) -> Result<()> {
    let mut io = FsImageIo::default();
    let written = convert_to_rgba(&mut io, images, dir).context("Conversion failed")?;
    for path in &written {
        println!("  {}", path.display());
    }
    println!("{} image(s) converted into {}", written.len(), dir.display());
    Ok(())
}
