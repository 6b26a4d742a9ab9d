//! Merge subcommand for pack-merger CLI

use crate::config::MergeConfig;
use crate::format::OutputFormat;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the merge subcommand
#[derive(Args, Debug, Default)]
pub struct MergeArgs {
    /// Directory containing the packages to merge (overrides config)
    #[arg(short, long, value_name = "DIR", conflicts_with = "pack")]
    pub dir: Option<PathBuf>,

    /// Package archive to merge; repeat to merge several, in order
    #[arg(short, long, value_name = "FILE")]
    pub pack: Vec<PathBuf>,

    /// Output directory; must not exist yet (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Do not warn about dropped duplicate definitions
    #[arg(long)]
    pub no_duplicate_warnings: bool,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,
}

impl MergeArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut MergeConfig) {
        apply_input(config, self.dir.as_ref(), &self.pack);
        if let Some(ref out) = self.out {
            config.out_dir = Some(out.clone());
        }
        if self.no_duplicate_warnings {
            config.duplicate_identifier_warnings = false;
        }
    }
}

/// Replace the configured input when `--dir` or `--pack` was given.
pub(crate) fn apply_input(config: &mut MergeConfig, dir: Option<&PathBuf>, packs: &[PathBuf]) {
    if let Some(dir) = dir {
        config.input.dir = Some(dir.clone());
        config.input.packs = None;
    } else if !packs.is_empty() {
        config.input.dir = None;
        config.input.packs = Some(packs.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputSource;

    #[test]
    fn test_packs_replace_configured_dir() {
        let mut config = MergeConfig::for_dir("configured", "out");
        let args = MergeArgs {
            pack: vec![PathBuf::from("a.mcpack")],
            ..Default::default()
        };
        args.apply_to(&mut config);

        assert_eq!(
            config.input_source().unwrap(),
            InputSource::Packs(vec![PathBuf::from("a.mcpack")])
        );
        assert_eq!(config.out_dir.as_deref(), Some(std::path::Path::new("out")));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = MergeConfig::for_dir("configured", "out");
        let before = config.clone();
        MergeArgs::default().apply_to(&mut config);
        assert_eq!(config, before);
    }

    #[test]
    fn test_disable_duplicate_warnings() {
        let mut config = MergeConfig::default();
        let args = MergeArgs {
            out: Some(PathBuf::from("merged")),
            no_duplicate_warnings: true,
            ..Default::default()
        };
        args.apply_to(&mut config);

        assert!(!config.duplicate_identifier_warnings);
        assert_eq!(config.out_dir, Some(PathBuf::from("merged")));
    }
}
