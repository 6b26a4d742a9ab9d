//! pack-merger
//!
//! Merges Minecraft Bedrock add-on packages into a single behavior pack and
//! resource pack.

use anyhow::{Context, Result};
use clap::Parser;
use pack_merger::cli::inspect::InspectArgs;
use pack_merger::cli::merge::MergeArgs;
use pack_merger::cli::{Cli, Command};
use pack_merger::config::{ConfigLoader, ConfigPaths, MergeConfig};
use pack_merger::format::{format_inspection, format_report};
use pack_merger::logging::{LogTarget, init_tracing};
use pack_merger::{MergeRun, inspect};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit_file(config_path);
    }
    let mut loader = ConfigLoader::load(paths)?;
    for (tier, path) in loader.sources() {
        debug!("Using {} config {}", tier, path.display());
    }

    match cli.command {
        Some(Command::Inspect(args)) => {
            args.apply_to(loader.config_mut());
            run_inspect(loader.config(), &args).await?;
        }
        Some(Command::Merge(args)) => {
            args.apply_to(loader.config_mut());
            run_merge(loader.into_config(), &args).await?;
        }
        None => {
            // Default: merge using configuration only
            let args = MergeArgs::default();
            run_merge(loader.into_config(), &args).await?;
        }
    }

    Ok(())
}

async fn run_merge(config: MergeConfig, args: &MergeArgs) -> Result<()> {
    let run = MergeRun::new(config).context("invalid merge configuration")?;
    info!(strategies = ?run.hook_names(), "Starting merge");

    let report = run.execute().await?;
    println!("{}", format_report(&report, args.format).trim_end());
    Ok(())
}

async fn run_inspect(config: &MergeConfig, args: &InspectArgs) -> Result<()> {
    let source = config
        .input_source()
        .context("invalid input configuration")?;
    let packages = inspect(&source).await?;
    println!("{}", format_inspection(&packages, args.format).trim_end());
    Ok(())
}
