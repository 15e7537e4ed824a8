pub mod resolve;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use pixmerge::{CanvasSizing, DEFAULT_TOLERANCE};

pub use self::resolve::{CliOverrides, ResolvedConfig};
pub use self::template::{config_file_exists, write_template};

pub(crate) const CONFIG_FILE: &str = "pixmerge.toml";

/// Which pixel actor folds images together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActorKind {
    /// Take differing, non-transparent pixels from each new image
    #[default]
    TakeNonEmpty,
    /// Paint differing pixels with the highlight color
    Highlight,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasKind {
    /// Tracked width x tracked width (historical behaviour)
    #[default]
    SquareFromWidth,
    /// Tracked width x tracked height
    TrackedExtent,
}

impl From<CanvasKind> for CanvasSizing {
    fn from(kind: CanvasKind) -> Self {
        match kind {
            CanvasKind::SquareFromWidth => Self::SquareFromWidth,
            CanvasKind::TrackedExtent => Self::TrackedExtent,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeSection {
    #[serde(default)]
    pub outfile: Option<PathBuf>,
    #[serde(default)]
    pub autosave: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareSection {
    /// Max per-channel difference still treated as equal.
    #[serde(default = "default_tolerance")]
    pub tolerance: u8,
    /// Out-of-tolerance channels allowed before a pixel counts as different.
    #[serde(default)]
    pub max_channel_diffs: usize,
}

impl Default for CompareSection {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_channel_diffs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSection {
    #[serde(default)]
    pub kind: ActorKind,
    #[serde(default = "default_highlight")]
    pub highlight: [u8; 4],
}

impl Default for ActorSection {
    fn default() -> Self {
        Self {
            kind: ActorKind::default(),
            highlight: default_highlight(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocateSection {
    #[serde(default)]
    pub canvas: CanvasKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewSection {
    /// Where `preview` and `test_merge` write their PNGs. Defaults to the
    /// system temp dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsSection {
    /// Groups with fewer pixels are dropped from reports.
    #[serde(default = "default_min_size")]
    pub min_size: usize,
}

impl Default for GroupsSection {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeSection,
    #[serde(default)]
    pub compare: CompareSection,
    #[serde(default)]
    pub actor: ActorSection,
    #[serde(default)]
    pub locate: LocateSection,
    #[serde(default)]
    pub groups: GroupsSection,
    #[serde(default)]
    pub preview: PreviewSection,
}

fn default_tolerance() -> u8 {
    DEFAULT_TOLERANCE
}

fn default_highlight() -> [u8; 4] {
    [255, 0, 0, 255]
}

fn default_min_size() -> usize {
    10
}

pub fn validate_tolerance(v: u8) -> Result<u8, String> {
    if v == u8::MAX {
        return Err(format!(
            "tolerance must be between 0 and 254, got {v} (255 treats every pixel as equal)"
        ));
    }
    Ok(v)
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        validate_tolerance(self.compare.tolerance).map_err(|e| anyhow::anyhow!("compare.{e}"))?;

        if let Some(outfile) = &self.merge.outfile
            && outfile.as_os_str().is_empty()
        {
            bail!("merge.outfile is set but empty. Remove it or give a path, e.g. outfile = \"merged.png\"");
        }

        if let Some(dir) = &self.preview.dir
            && dir.as_os_str().is_empty()
        {
            bail!("preview.dir is set but empty. Remove it to use the temp dir");
        }

        if self.compare.max_channel_diffs > 3 {
            bail!(
                "compare.max_channel_diffs = {} can never be exceeded by an RGBA pixel (max 3)",
                self.compare.max_channel_diffs
            );
        }

        Ok(())
    }
}

pub fn parse(content: &str, origin: &Path) -> Result<Config> {
    let config: Config =
        toml::from_str(content).with_context(|| format!("Failed to parse {}", origin.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load `pixmerge.toml` from the working directory. A missing file yields the
/// defaults.
pub fn load() -> Result<Config> {
    load_from(Path::new(CONFIG_FILE))
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse("", Path::new("pixmerge.toml")).unwrap();
        assert_eq!(config.compare.tolerance, 5);
        assert_eq!(config.actor.kind, ActorKind::TakeNonEmpty);
        assert_eq!(config.actor.highlight, [255, 0, 0, 255]);
        assert_eq!(config.locate.canvas, CanvasKind::SquareFromWidth);
        assert_eq!(config.groups.min_size, 10);
        assert!(config.merge.outfile.is_none());
    }

    #[test]
    fn sections_parse() {
        let config = parse(
            r#"
            [merge]
            outfile = "out/fused.png"
            autosave = true

            [compare]
            tolerance = 12
            max_channel_diffs = 1

            [actor]
            kind = "highlight"
            highlight = [0, 255, 0, 255]

            [locate]
            canvas = "tracked-extent"

            [preview]
            dir = "previews"
            "#,
            Path::new("pixmerge.toml"),
        )
        .unwrap();
        assert_eq!(config.merge.outfile, Some(PathBuf::from("out/fused.png")));
        assert!(config.merge.autosave);
        assert_eq!(config.compare.tolerance, 12);
        assert_eq!(config.compare.max_channel_diffs, 1);
        assert_eq!(config.actor.kind, ActorKind::Highlight);
        assert_eq!(config.locate.canvas, CanvasKind::TrackedExtent);
        assert_eq!(config.preview.dir, Some(PathBuf::from("previews")));
    }

    #[test]
    fn rejects_saturated_tolerance() {
        let err = parse("[compare]\ntolerance = 255\n", Path::new("pixmerge.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("compare.tolerance"));
    }

    #[test]
    fn rejects_unreachable_channel_budget() {
        assert!(parse("[compare]\nmax_channel_diffs = 4\n", Path::new("pixmerge.toml")).is_err());
    }

    #[test]
    fn rejects_unknown_actor() {
        assert!(parse("[actor]\nkind = \"blend\"\n", Path::new("pixmerge.toml")).is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.compare.tolerance, 5);
    }
}
