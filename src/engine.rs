//! The merge orchestrator.
//!
//! One [`MergeRun`] is one pass:
//! extract all packages (concurrently) → for each package in order, for each
//! module in order: reconcile versions, then dispatch the module's
//! subdirectories to the strategies (concurrently) → finalize strategies →
//! synthesize manifests → report.
//!
//! All shared state (registries, version state, warnings) is owned by the run
//! and dropped with it.

use crate::config::{InputSource, MergeConfig};
use crate::error::{IoContext, MergeError, MergeResult};
use crate::hooks::{HookContext, MergeHook, SubDirectory};
use crate::package::{self, PreparedPackage};
use crate::report::{MergeReport, ModuleInspection, PackageInspection, SubdirectoryInspection};
use crate::strategies::builtin_hooks;
use crate::synth::{self, ScriptEntry, SynthInput};
use crate::types::{PackModule, SourcePackage};
use crate::versions::VersionState;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

type HookList = Arc<[Arc<dyn MergeHook>]>;

/// A single merge run.
pub struct MergeRun {
    config: Arc<MergeConfig>,
    hooks: Vec<Arc<dyn MergeHook>>,
}

impl MergeRun {
    /// Create a run with the built-in strategies registered.
    pub fn new(config: MergeConfig) -> MergeResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            hooks: builtin_hooks(),
        })
    }

    /// Append an extension strategy; it runs after everything registered before it.
    pub fn with_hook(mut self, hook: Arc<dyn MergeHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Names of the registered strategies, in order.
    pub fn hook_names(&self) -> Vec<String> {
        self.hooks.iter().map(|h| h.name().to_string()).collect()
    }

    /// Run the merge to completion.
    ///
    /// Fatal errors abort immediately; output already written is left on disk.
    pub async fn execute(self) -> MergeResult<MergeReport> {
        let out_dir = self.config.out_dir()?.to_path_buf();
        if out_dir.exists() {
            return Err(MergeError::OutputExists(out_dir));
        }

        let inputs = package::resolve_inputs(&self.config.input_source()?)?;
        if inputs.is_empty() {
            return Err(MergeError::config("no input packages found"));
        }
        let prepared = package::prepare_packages(inputs).await?;
        let package_names: Vec<String> = prepared.iter().map(|p| p.package.name.clone()).collect();
        info!(packages = ?package_names, "Merging {} packages", package_names.len());

        let ctx = Arc::new(HookContext::new(Arc::clone(&self.config), &out_dir));
        for root in [ctx.behavior_root(), ctx.resource_root()] {
            tokio::fs::create_dir_all(root).await.at(root)?;
        }

        let hooks: HookList = self.hooks.into();
        let mut versions = VersionState::new();
        let mut scripts = Vec::new();

        for PreparedPackage { package, .. } in &prepared {
            let modules = package::discover_modules(package).await?;
            for module in &modules {
                debug!(package = %package.name, module = %module.name, kind = %module.kind, "Processing module");
                reconcile_versions(&ctx, &mut versions, module);
                if let Some(entry) = &module.manifest.script_entry {
                    scripts.push(ScriptEntry {
                        package: package.name.clone(),
                        entry: entry.clone(),
                    });
                }
                dispatch_module(&hooks, &ctx, package, module).await?;
            }
        }

        for hook in hooks.iter() {
            hook.finalize(&ctx).await?;
        }

        synth::write_outputs(
            ctx.behavior_root(),
            ctx.resource_root(),
            SynthInput {
                packages: &package_names,
                versions: &versions,
                scripts: &scripts,
            },
        )
        .await?;

        let report = MergeReport {
            packages: package_names,
            out_dir,
            warning_count: ctx.log().warning_count(),
            warnings: ctx.log().warnings(),
            manual_merges: ctx.log().manual_merges(),
            min_engine_version: versions.min_engine_version().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        };
        info!(manual_merges = report.manual_merges.len(), "Merge {}", report.summary_line());
        Ok(report)
    }
}

/// Fold one module's manifest into the running version state.
fn reconcile_versions(ctx: &HookContext, versions: &mut VersionState, module: &PackModule) {
    if let Some(declared) = module.manifest.min_engine_version {
        versions.observe_engine(declared);
    }
    for dep in &module.manifest.dependencies {
        if let Some(conflict) = versions.observe_dependency(&dep.module_name, dep.version.clone()) {
            ctx.warn(conflict.to_string());
        }
    }
}

/// Dispatch every subdirectory of `module` concurrently and wait for all of them.
async fn dispatch_module(
    hooks: &HookList,
    ctx: &Arc<HookContext>,
    package: &SourcePackage,
    module: &PackModule,
) -> MergeResult<()> {
    let mut tasks = JoinSet::new();
    for name in &module.subdirectories {
        let sub = SubDirectory::new(
            &package.name,
            &module.name,
            module.kind,
            name,
            module.root.join(name),
        );
        let hooks = Arc::clone(hooks);
        let ctx = Arc::clone(ctx);
        tasks.spawn(async move { dispatch_subdirectory(&hooks, &ctx, &sub).await });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined.map_err(MergeError::internal).and_then(|r| r) {
            first_error.get_or_insert(err);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Offer `sub` to every hook in order; record a manual merge if none claims it.
async fn dispatch_subdirectory(
    hooks: &[Arc<dyn MergeHook>],
    ctx: &HookContext,
    sub: &SubDirectory,
) -> MergeResult<()> {
    let mut owner: Option<&str> = None;
    for hook in hooks {
        let claimed = hook.merge_subdirectory(ctx, sub).await?;
        if claimed && owner.is_none() {
            owner = Some(hook.name());
        }
    }

    match owner {
        Some(strategy) => debug!(subdirectory = %sub.display_name, strategy, "Subdirectory merged"),
        None => ctx.manual_merge(&sub.display_name, "subdirectory could not be merged"),
    }
    Ok(())
}

/// Extract and describe the input packages without writing any output.
pub async fn inspect(source: &InputSource) -> MergeResult<Vec<PackageInspection>> {
    inspect_with_hooks(source, &builtin_hooks()).await
}

/// [`inspect`] against an explicit strategy list.
pub async fn inspect_with_hooks(
    source: &InputSource,
    hooks: &[Arc<dyn MergeHook>],
) -> MergeResult<Vec<PackageInspection>> {
    let prepared = package::prepare_packages(package::resolve_inputs(source)?).await?;

    let mut out = Vec::with_capacity(prepared.len());
    for PreparedPackage { package, .. } in &prepared {
        let modules = package::discover_modules(package).await?;
        out.push(PackageInspection {
            name: package.name.clone(),
            origin: package.origin.clone(),
            modules: modules
                .iter()
                .map(|module| ModuleInspection {
                    name: module.name.clone(),
                    kind: module.kind,
                    min_engine_version: module.manifest.min_engine_version.map(|v| v.to_string()),
                    script_entry: module.manifest.script_entry.clone(),
                    dependencies: module
                        .manifest
                        .dependencies
                        .iter()
                        .map(|d| format!("{}@{}", d.module_name, d.version))
                        .collect(),
                    subdirectories: module
                        .subdirectories
                        .iter()
                        .map(|name| SubdirectoryInspection {
                            name: name.clone(),
                            strategy: hooks
                                .iter()
                                .find(|h| h.accepts(module.kind, name))
                                .map(|h| h.name().to_string()),
                        })
                        .collect(),
                })
                .collect(),
        });
    }
    Ok(out)
}
