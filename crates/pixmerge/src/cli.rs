use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config;
use crate::config::{ActorKind, CanvasKind};

fn parse_tolerance(s: &str) -> Result<u8, String> {
    let v: u8 = s.parse().map_err(|e| format!("{e}"))?;
    config::validate_tolerance(v)
}

#[derive(Parser)]
#[command(
    name = "pixmerge",
    about = "Fold images together, cluster their differences and find cropped regions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Comparator/actor choices shared by the merging commands.
#[derive(Args, Debug, Clone, Default)]
pub struct StrategyArgs {
    /// How differing pixels are folded in (overrides config)
    #[arg(long, value_enum)]
    pub actor: Option<ActorKind>,
    /// Max per-channel difference treated as equal (0–254)
    #[arg(long, value_parser = parse_tolerance)]
    pub tolerance: Option<u8>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create pixmerge.toml with default settings
    Init {
        /// Overwrite an existing config
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Seed with the first image and fold the rest in, then save
    Merge {
        /// Images to merge, seed first
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Output path (overrides config)
        #[arg(long, short = 'o')]
        outfile: Option<PathBuf>,
        /// Save after every merge call
        #[arg(long)]
        autosave: bool,
        /// Print step reports as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        strategy: StrategyArgs,
    },

    /// Merge images onto a base without keeping the result
    Preview {
        /// Base image the preview starts from
        base: PathBuf,
        /// Images folded into the preview
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Write the preview here instead of opening a temporary file
        #[arg(long)]
        export: Option<PathBuf>,
        #[command(flatten)]
        strategy: StrategyArgs,
    },

    /// Find where a cropped (possibly rotated) image sits inside a tracked image
    Locate {
        /// Image to search in
        tracked: PathBuf,
        /// Cropped sub-image to search for
        sub: PathBuf,
        /// Where the located overlay is written
        #[arg(long, short = 'o')]
        outfile: PathBuf,
        /// Canvas size policy for the overlay (overrides config)
        #[arg(long, value_enum)]
        canvas: Option<CanvasKind>,
        /// Max per-channel difference treated as equal (0–254)
        #[arg(long, value_parser = parse_tolerance)]
        tolerance: Option<u8>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge images and report the clustered pixel differences
    Groups {
        /// Images to merge, seed first
        #[arg(required = true, num_args = 2..)]
        images: Vec<PathBuf>,
        /// Drop groups smaller than this (overrides config)
        #[arg(long)]
        min_size: Option<usize>,
        /// Write the largest remaining group to this PNG
        #[arg(long)]
        first: Option<PathBuf>,
        /// Max groups listed in terminal output
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Print groups as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        strategy: StrategyArgs,
    },

    /// Re-encode images as RGBA PNGs
    Convert {
        /// Images to convert
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Output directory
        #[arg(long, default_value = "converts")]
        dir: PathBuf,
    },
}
