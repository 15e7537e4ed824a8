use std::path::Path;

use anyhow::{Context, Result};

use super::CONFIG_FILE;

/// Hand-crafted config template with commented-out keys.
/// Used by `pixmerge init` instead of `toml::to_string_pretty()` so that
/// users can see the available knobs.
pub(crate) const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Merging (all fields optional)
# ─────────────────────────────────────────────────────────
[merge]
# outfile = "merged.png"            # where merge results are saved
# autosave = false                  # save after every merge call

# ─────────────────────────────────────────────────────────
# Pixel comparison
# ─────────────────────────────────────────────────────────
[compare]
# tolerance = 5                     # max per-channel difference treated as equal
# max_channel_diffs = 0             # out-of-tolerance channels allowed (0-3)

[actor]
# kind = "take-non-empty"           # "take-non-empty" | "highlight"
# highlight = [255, 0, 0, 255]      # RGBA used by "highlight"

# ─────────────────────────────────────────────────────────
# Region search and grouping
# ─────────────────────────────────────────────────────────
[locate]
# canvas = "square-from-width"      # "square-from-width" | "tracked-extent"

[groups]
# min_size = 10                     # drop smaller difference groups

[preview]
# dir = "previews"                  # where previews go (default: system temp dir)
"#;

pub fn config_file_exists() -> bool {
    Path::new(CONFIG_FILE).exists()
}

/// Write the hand-crafted config template (with commented-out keys).
pub fn write_template() -> Result<()> {
    std::fs::write(CONFIG_FILE, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {CONFIG_FILE}"))?;
    Ok(())
}
