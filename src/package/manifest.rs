//! Pack `manifest.json` parsing.

use crate::error::{MergeError, MergeResult};
use crate::types::ModuleKind;
use crate::versions::{EngineVersion, parse_dependency_version};
use semver::Version;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A dependency on a named script module, e.g. `@minecraft/server`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDependency {
    pub module_name: String,
    pub version: Version,
}

/// The parts of a pack manifest the merge engine reasons about.
#[derive(Debug, Clone, PartialEq)]
pub struct PackManifest {
    pub path: PathBuf,
    pub kind: ModuleKind,
    pub header_name: Option<String>,
    /// `None` when the header omits `min_engine_version`.
    pub min_engine_version: Option<EngineVersion>,
    /// `entry` of the script module, e.g. `scripts/main.js`.
    pub script_entry: Option<String>,
    /// Named dependencies only; UUID links to sibling packs are dropped.
    pub dependencies: Vec<ModuleDependency>,
}

impl PackManifest {
    /// Parse an already-decoded manifest document.
    pub fn from_value(path: &Path, doc: &Value) -> MergeResult<Self> {
        let header = doc
            .get("header")
            .and_then(Value::as_object)
            .ok_or_else(|| MergeError::parse(path, "manifest has no \"header\" object"))?;

        let modules = doc
            .get("modules")
            .and_then(Value::as_array)
            .ok_or_else(|| MergeError::parse(path, "manifest has no \"modules\" array"))?;

        let kind = modules
            .iter()
            .filter_map(|m| m.get("type").and_then(Value::as_str))
            .find_map(ModuleKind::from_module_type)
            .ok_or_else(|| {
                MergeError::parse(path, "manifest declares neither a data nor a resources module")
            })?;

        let min_engine_version = match header.get("min_engine_version") {
            None => None,
            Some(raw) => Some(EngineVersion::from_value(raw).ok_or_else(|| {
                MergeError::parse(path, format!("invalid min_engine_version {raw}"))
            })?),
        };

        let mut script_entry = None;
        for module in modules {
            if module.get("type").and_then(Value::as_str) != Some("script") {
                continue;
            }
            let entry = module
                .get("entry")
                .and_then(Value::as_str)
                .ok_or_else(|| MergeError::parse(path, "script module has no \"entry\""))?;
            script_entry = Some(entry.to_string());
        }

        let mut dependencies = Vec::new();
        if let Some(deps) = doc.get("dependencies").and_then(Value::as_array) {
            for dep in deps {
                let Some(module_name) = dep.get("module_name").and_then(Value::as_str) else {
                    continue;
                };
                let raw = dep.get("version").unwrap_or(&Value::Null);
                let version = parse_dependency_version(raw).ok_or_else(|| {
                    MergeError::parse(
                        path,
                        format!("dependency {module_name} has invalid version {raw}"),
                    )
                })?;
                dependencies.push(ModuleDependency {
                    module_name: module_name.to_string(),
                    version,
                });
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            kind,
            header_name: header.get("name").and_then(Value::as_str).map(String::from),
            min_engine_version,
            script_entry,
            dependencies,
        })
    }

    /// Read and parse `manifest.json` at `path`.
    pub async fn load(path: &Path) -> MergeResult<Self> {
        let doc = crate::fsutil::read_json(path).await?;
        Self::from_value(path, &doc)
    }
}
