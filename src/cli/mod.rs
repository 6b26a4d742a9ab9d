//! CLI command definitions for pack-merger
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod inspect;
pub mod merge;

use clap::{Parser, Subcommand};
use inspect::InspectArgs;
use merge::MergeArgs;

/// Merge Minecraft Bedrock add-ons into a single behavior/resource pack pair
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the input packages (default if no subcommand given)
    Merge(MergeArgs),

    /// Describe the input packages and which strategy takes each subdirectory
    Inspect(InspectArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn test_parse_merge_with_packs() {
        let cli = Cli::parse_from([
            "pack-merger",
            "merge",
            "--pack",
            "a.mcaddon",
            "--pack",
            "b.mcaddon",
            "--out",
            "merged",
        ]);
        let Some(Command::Merge(args)) = cli.command else {
            panic!("expected merge subcommand");
        };
        assert_eq!(
            args.pack,
            vec![PathBuf::from("a.mcaddon"), PathBuf::from("b.mcaddon")]
        );
        assert_eq!(args.out, Some(PathBuf::from("merged")));
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pack-merger", "inspect", "--dir", "packs", "-v", "--log", "0"]);
        assert!(cli.verbose);
        assert_eq!(cli.log, "0");
        assert!(matches!(cli.command, Some(Command::Inspect(_))));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["pack-merger"]);
        assert!(cli.command.is_none());
    }
}
