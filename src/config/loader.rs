//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::MergeConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names searched for in the project directory, in order.
const PROJECT_CONFIG_FILES: &[&str] = &["pack-merger.yaml", "pack-merger.yml", "pack-merger.json"];

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    User = 1,
    Project = 2,
    Explicit = 3,
    Environment = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::Explicit => write!(f, "explicit"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Locations searched for configuration files.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
    /// Project directory searched for `pack-merger.{yaml,yml,json}`
    pub project_dir: Option<PathBuf>,
    /// File given with `--config`; replaces the project tier
    pub explicit_file: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from the environment and platform defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var("PACK_MERGER_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("pack-merger")));

        Self {
            user_dir,
            project_dir: Some(PathBuf::from(".")),
            explicit_file: None,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            user_dir,
            project_dir,
            explicit_file: None,
        }
    }

    pub fn with_explicit_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(file.into());
        self
    }

    /// First project config file that exists.
    pub fn project_file(&self) -> Option<PathBuf> {
        let dir = self.project_dir.as_ref()?;
        PROJECT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn user_file(&self) -> Option<PathBuf> {
        let path = self.user_dir.as_ref()?.join("config.yaml");
        path.is_file().then_some(path)
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: MergeConfig,
    /// Files that contributed, lowest tier first
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load configuration from all tiers using the process environment.
    pub fn load(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup.
    pub fn load_with_env(paths: ConfigPaths, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut tiers: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        tiers.push(serde_json::to_value(MergeConfig::default())?);

        if let Some(user_file) = paths.user_file() {
            tiers.push(read_config_value(&user_file)?);
            sources.push((ConfigTier::User, user_file));
        }

        if let Some(ref explicit) = paths.explicit_file {
            tiers.push(read_config_value(explicit)?);
            sources.push((ConfigTier::Explicit, explicit.clone()));
        } else if let Some(project_file) = paths.project_file() {
            tiers.push(read_config_value(&project_file)?);
            sources.push((ConfigTier::Project, project_file));
        }

        let merged = deep_merge_all(tiers);
        let mut config: MergeConfig =
            serde_json::from_value(merged).context("invalid configuration structure")?;

        apply_env_overrides(&mut config, env)?;

        for (tier, path) in &sources {
            debug!(tier = %tier, path = %path.display(), "Loaded config file");
        }

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Mutable access for applying CLI overrides.
    pub fn config_mut(&mut self) -> &mut MergeConfig {
        &mut self.config
    }

    pub fn into_config(self) -> MergeConfig {
        self.config
    }

    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

/// Read a YAML or JSON config file into a generic value.
fn read_config_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(value)
}

fn apply_env_overrides(
    config: &mut MergeConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(dir) = env("PACK_MERGER_INPUT_DIR") {
        config.input.dir = Some(PathBuf::from(dir));
        config.input.packs = None;
    }

    if let Some(out_dir) = env("PACK_MERGER_OUT_DIR") {
        config.out_dir = Some(PathBuf::from(out_dir));
    }

    if let Some(flag) = env("PACK_MERGER_DUPLICATE_WARNINGS") {
        config.duplicate_identifier_warnings = parse_bool(&flag).with_context(|| {
            format!("PACK_MERGER_DUPLICATE_WARNINGS must be true or false, got '{flag}'")
        })?;
    }

    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
