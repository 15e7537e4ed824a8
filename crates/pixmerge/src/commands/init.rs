use anyhow::{Result, bail};

use crate::config;

/// `pixmerge init`: create pixmerge.toml.
pub fn init(force: bool) -> Result<()> {
    if !force && config::config_file_exists() {
        bail!("pixmerge.toml already exists (use --force to overwrite)");
    }

    config::write_template()?;

    let verb = if force { "Regenerated" } else { "Created" };
    println!("{verb} pixmerge.toml");
    Ok(())
}
