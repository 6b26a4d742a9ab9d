//! The merge strategy extension point.
//!
//! A strategy implements [`MergeHook`]. For every subdirectory of every pack
//! module the orchestrator calls each registered hook in order; a hook
//! returns `true` when it claimed and fully handled the subdirectory. Once
//! all packages are processed each hook's [`MergeHook::finalize`] runs so it
//! can write out state aggregated across packages.
//!
//! Hooks only see the run through [`HookContext`]: the read-only config, the
//! two output roots, and the warning / manual-merge channels.

use crate::config::MergeConfig;
use crate::error::MergeResult;
use crate::logging::RunLog;
use crate::types::ModuleKind;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A subdirectory of one pack module, handed to strategies.
#[derive(Debug, Clone)]
pub struct SubDirectory {
    /// Owning source package.
    pub package: String,
    /// Owning module directory name.
    pub module: String,
    pub module_kind: ModuleKind,
    /// Subdirectory name, e.g. `blocks`.
    pub name: String,
    /// `<package>/<module>/<name>`, used in messages.
    pub display_name: String,
    /// Location of the subdirectory on disk.
    pub path: PathBuf,
}

impl SubDirectory {
    pub fn new(
        package: &str,
        module: &str,
        module_kind: ModuleKind,
        name: &str,
        path: PathBuf,
    ) -> Self {
        Self {
            package: package.to_string(),
            module: module.to_string(),
            module_kind,
            name: name.to_string(),
            display_name: format!("{package}/{module}/{name}"),
            path,
        }
    }

    /// Display form of a file below this subdirectory, e.g. `Gems/BP/blocks/ruby.json`.
    pub fn display_path(&self, file: &Path) -> PathBuf {
        let rel = file.strip_prefix(&self.path).unwrap_or(file);
        PathBuf::from(&self.display_name).join(rel)
    }
}

/// What a strategy may see and do during a run.
#[derive(Debug)]
pub struct HookContext {
    config: Arc<MergeConfig>,
    behavior_root: PathBuf,
    resource_root: PathBuf,
    log: RunLog,
}

impl HookContext {
    pub fn new(config: Arc<MergeConfig>, out_dir: &Path) -> Self {
        Self {
            config,
            behavior_root: out_dir.join(ModuleKind::Behavior.output_dir()),
            resource_root: out_dir.join(ModuleKind::Resource.output_dir()),
            log: RunLog::new(),
        }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Root of the output behavior pack (`<outDir>/BP`).
    pub fn behavior_root(&self) -> &Path {
        &self.behavior_root
    }

    /// Root of the output resource pack (`<outDir>/RP`).
    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    pub fn module_root(&self, kind: ModuleKind) -> &Path {
        match kind {
            ModuleKind::Behavior => &self.behavior_root,
            ModuleKind::Resource => &self.resource_root,
        }
    }

    /// Emit a warning; counts towards the run's warning total.
    pub fn warn(&self, message: impl Into<String>) {
        self.log.warning(message);
    }

    pub fn info(&self, message: &str) {
        self.log.info(message);
    }

    /// Warn about a dropped duplicate unless duplicate warnings are disabled.
    pub fn duplicate(&self, what: &str, key: &str, dropped: &Path, original: &Path) {
        if self.config.duplicate_identifier_warnings {
            self.warn(format!(
                "Duplicate {what} '{key}': dropped {} (original: {})",
                dropped.display(),
                original.display()
            ));
        }
    }

    /// Record that `subject` must be merged by hand.
    pub fn manual_merge(&self, subject: impl Into<String>, reason: impl Into<String>) {
        self.log.manual_merge(subject, reason);
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }
}

/// A pluggable merge strategy.
#[async_trait]
pub trait MergeHook: Send + Sync {
    /// Short name used in logs and inspection output.
    fn name(&self) -> &str;

    /// Whether this strategy handles subdirectories called `name` in modules of `kind`.
    ///
    /// Used to preview claims without touching the filesystem.
    fn accepts(&self, _kind: ModuleKind, _name: &str) -> bool {
        false
    }

    /// Merge one subdirectory. Returns `true` if it was claimed and fully handled.
    async fn merge_subdirectory(&self, ctx: &HookContext, sub: &SubDirectory)
    -> MergeResult<bool>;

    /// Flush state accumulated across all packages. Runs once per run.
    async fn finalize(&self, _ctx: &HookContext) -> MergeResult<()> {
        Ok(())
    }
}
