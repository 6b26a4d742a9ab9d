//! Inspect subcommand for pack-merger CLI
//!
//! Extracts and describes the input packages without writing any output.

use super::merge::apply_input;
use crate::config::MergeConfig;
use crate::format::OutputFormat;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the inspect subcommand
#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// Directory containing the packages to inspect (overrides config)
    #[arg(short, long, value_name = "DIR", conflicts_with = "pack")]
    pub dir: Option<PathBuf>,

    /// Package archive to inspect; repeat for several
    #[arg(short, long, value_name = "FILE")]
    pub pack: Vec<PathBuf>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,
}

impl InspectArgs {
    pub fn apply_to(&self, config: &mut MergeConfig) {
        apply_input(config, self.dir.as_ref(), &self.pack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputSource;

    #[test]
    fn test_dir_override() {
        let mut config = MergeConfig::for_packs(vec![PathBuf::from("a.zip")], "out");
        let args = InspectArgs {
            dir: Some(PathBuf::from("packs")),
            ..Default::default()
        };
        args.apply_to(&mut config);
        assert_eq!(
            config.input_source().unwrap(),
            InputSource::Dir(PathBuf::from("packs"))
        );
    }
}
