use std::path::PathBuf;

use anyhow::{Context, Result};
use image::Rgba;

use pixmerge::{
    CanvasSizing, ColorDiff, FsImageIo, Highlight, Merger, PixelEngine, TakeNonEmptySecond,
};

use super::{ActorKind, CanvasKind, Config, load, validate_tolerance};

const DEFAULT_OUTFILE: &str = "merged.png";

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub outfile: Option<PathBuf>,
    pub autosave: bool,
    pub tolerance: Option<u8>,
    pub actor: Option<ActorKind>,
    pub canvas: Option<CanvasKind>,
    pub min_size: Option<usize>,
}

/// Values read from `PIXMERGE_*` environment variables.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    pub outfile: Option<PathBuf>,
    pub tolerance: Option<u8>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        let outfile = std::env::var_os("PIXMERGE_OUTFILE").map(PathBuf::from);
        let tolerance = std::env::var("PIXMERGE_TOLERANCE")
            .ok()
            .map(|v| v.parse::<u8>())
            .transpose()
            .context("PIXMERGE_TOLERANCE must be an integer between 0 and 254")?;
        Ok(Self { outfile, tolerance })
    }
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub outfile: PathBuf,
    pub autosave: bool,
    pub tolerance: u8,
    pub max_channel_diffs: usize,
    pub actor: ActorKind,
    pub highlight: [u8; 4],
    pub canvas: CanvasSizing,
    pub min_size: usize,
    pub preview_dir: Option<PathBuf>,
}

impl ResolvedConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        let file_config = load()?;
        let env = EnvOverrides::from_env()?;
        Self::from_layers(file_config, env, cli)
    }

    pub fn from_layers(file: Config, env: EnvOverrides, cli: CliOverrides) -> Result<Self> {
        let outfile = cli
            .outfile
            .or(env.outfile)
            .or(file.merge.outfile)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTFILE));

        let tolerance = cli
            .tolerance
            .or(env.tolerance)
            .unwrap_or(file.compare.tolerance);
        validate_tolerance(tolerance).map_err(|e| anyhow::anyhow!("{e}"))?;

        Ok(Self {
            outfile,
            autosave: cli.autosave || file.merge.autosave,
            tolerance,
            max_channel_diffs: file.compare.max_channel_diffs,
            actor: cli.actor.unwrap_or(file.actor.kind),
            highlight: file.actor.highlight,
            canvas: cli.canvas.unwrap_or(file.locate.canvas).into(),
            min_size: cli.min_size.unwrap_or(file.groups.min_size),
            preview_dir: file.preview.dir,
        })
    }

    /// Engine wired with the configured comparator and actor.
    pub fn engine(&self, record: bool) -> PixelEngine {
        let comparator = ColorDiff::new(self.tolerance, self.max_channel_diffs);
        let engine = match self.actor {
            ActorKind::TakeNonEmpty => PixelEngine::new(comparator, TakeNonEmptySecond),
            ActorKind::Highlight => {
                PixelEngine::new(comparator, Highlight::new(Rgba(self.highlight)))
            }
        };
        if record { engine.recording() } else { engine }
    }

    pub fn io(&self) -> FsImageIo {
        match &self.preview_dir {
            Some(dir) => FsImageIo::with_preview_dir(dir),
            None => FsImageIo::default(),
        }
    }

    pub fn merger(&self, record: bool) -> Merger {
        Merger::with_io(self.outfile.clone(), self.io(), self.engine(record))
            .with_autosave(self.autosave)
            .with_canvas(self.canvas)
            .with_locate_tolerance(self.tolerance)
    }
}
