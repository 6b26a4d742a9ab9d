//! Configuration types.
//!
//! Key names on disk follow the camelCase surface:
//! `{input: {dir} | {packs: [...]}, outDir, duplicateIdentifierWarnings}`.

use crate::error::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the input packages come from, as written in config files.
///
/// Exactly one of `dir` and `packs` must be set once all tiers are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory whose archives (and pre-extracted package folders) are merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Explicit list of archives, merged in the order given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packs: Option<Vec<PathBuf>>,
}

/// Validated input selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Dir(PathBuf),
    Packs(Vec<PathBuf>),
}

/// Configuration consumed (read-only) by a merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConfig {
    #[serde(default)]
    pub input: InputConfig,

    /// Output root; `BP/` and `RP/` are created beneath it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    /// Emit a warning for every dropped duplicate (default: true).
    #[serde(default = "default_duplicate_warnings")]
    pub duplicate_identifier_warnings: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            out_dir: None,
            duplicate_identifier_warnings: default_duplicate_warnings(),
        }
    }
}

fn default_duplicate_warnings() -> bool {
    true
}

impl MergeConfig {
    /// Config for merging an explicit list of packs into `out_dir`.
    pub fn for_packs(packs: Vec<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: InputConfig {
                dir: None,
                packs: Some(packs),
            },
            out_dir: Some(out_dir.into()),
            ..Self::default()
        }
    }

    /// Config for merging every package found in `dir` into `out_dir`.
    pub fn for_dir(dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: InputConfig {
                dir: Some(dir.into()),
                packs: None,
            },
            out_dir: Some(out_dir.into()),
            ..Self::default()
        }
    }

    pub fn with_duplicate_warnings(mut self, enabled: bool) -> Self {
        self.duplicate_identifier_warnings = enabled;
        self
    }

    /// Resolve the input selection, rejecting ambiguous or empty input.
    pub fn input_source(&self) -> MergeResult<InputSource> {
        match (&self.input.dir, &self.input.packs) {
            (Some(_), Some(_)) => Err(MergeError::config(
                "input.dir and input.packs are mutually exclusive",
            )),
            (Some(dir), None) => Ok(InputSource::Dir(dir.clone())),
            (None, Some(packs)) if packs.is_empty() => {
                Err(MergeError::config("input.packs must not be empty"))
            }
            (None, Some(packs)) => Ok(InputSource::Packs(packs.clone())),
            (None, None) => Err(MergeError::config(
                "one of input.dir or input.packs is required",
            )),
        }
    }

    /// The configured output root.
    pub fn out_dir(&self) -> MergeResult<&Path> {
        match self.out_dir.as_deref() {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir),
            _ => Err(MergeError::config("outDir is required")),
        }
    }

    /// Check that the configuration describes a runnable merge.
    pub fn validate(&self) -> MergeResult<()> {
        self.input_source()?;
        self.out_dir()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dir_config() {
        let yaml = r#"
input:
  dir: ./packs
outDir: ./merged
"#;
        let config: MergeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.input_source().unwrap(),
            InputSource::Dir(PathBuf::from("./packs"))
        );
        assert_eq!(config.out_dir().unwrap(), Path::new("./merged"));
        assert!(config.duplicate_identifier_warnings);
    }

    #[test]
    fn test_parse_json_packs_config() {
        let json = r#"{
            "input": {"packs": ["a.mcaddon", "b.mcpack"]},
            "outDir": "out",
            "duplicateIdentifierWarnings": false
        }"#;
        let config: MergeConfig = serde_yaml::from_str(json).unwrap();
        assert_eq!(
            config.input_source().unwrap(),
            InputSource::Packs(vec![
                PathBuf::from("a.mcaddon"),
                PathBuf::from("b.mcpack")
            ])
        );
        assert!(!config.duplicate_identifier_warnings);
    }

    #[test]
    fn test_dir_and_packs_are_exclusive() {
        let mut config = MergeConfig::for_dir("packs", "out");
        config.input.packs = Some(vec![PathBuf::from("a.mcpack")]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_missing_input_and_out_dir() {
        let config = MergeConfig::default();
        assert!(config.input_source().is_err());
        assert!(config.out_dir().is_err());

        let config = MergeConfig::for_packs(vec![], "out");
        assert!(config.validate().is_err());
    }
}
