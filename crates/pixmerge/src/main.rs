mod cli;
mod commands;
mod config;
mod report;

use clap::Parser;
use config::{CliOverrides, ResolvedConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixmerge=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Merge {
            images,
            outfile,
            autosave,
            json,
            strategy,
        } => {
            let overrides = CliOverrides {
                outfile,
                autosave,
                tolerance: strategy.tolerance,
                actor: strategy.actor,
                ..Default::default()
            };
            let config = ResolvedConfig::new(overrides)?;
            commands::merge(&config, &images, json)?;
        }
        cli::Command::Preview {
            base,
            images,
            export,
            strategy,
        } => {
            let overrides = CliOverrides {
                tolerance: strategy.tolerance,
                actor: strategy.actor,
                ..Default::default()
            };
            let config = ResolvedConfig::new(overrides)?;
            commands::preview(&config, &base, &images, export.as_deref())?;
        }
        cli::Command::Locate {
            tracked,
            sub,
            outfile,
            canvas,
            tolerance,
            json,
        } => {
            let overrides = CliOverrides {
                tolerance,
                canvas,
                ..Default::default()
            };
            let config = ResolvedConfig::new(overrides)?;
            let code = commands::locate(&config, &tracked, &sub, &outfile, json)?;
            std::process::exit(code);
        }
        cli::Command::Groups {
            images,
            min_size,
            first,
            limit,
            json,
            strategy,
        } => {
            let overrides = CliOverrides {
                tolerance: strategy.tolerance,
                actor: strategy.actor,
                min_size,
                ..Default::default()
            };
            let config = ResolvedConfig::new(overrides)?;
            commands::groups(&config, &images, first.as_deref(), limit, json)?;
        }
        cli::Command::Convert { images, dir } => {
            commands::convert(&images, &dir)?;
        }
    }

    Ok(())
}
