//! Source package discovery.
//!
//! A source package is laid out either as a single pack (manifest at the
//! root) or as an add-on with one folder per pack. Some archives wrap the
//! whole add-on in one extra folder; that level is looked through.

pub mod archive;
mod manifest;

pub use archive::{PreparedPackage, is_archive_name, list_input_dir, package_name, prepare_packages};
pub use manifest::{ModuleDependency, PackManifest};

use crate::config::InputSource;
use crate::error::{MergeError, MergeResult};
use crate::fsutil::list_dir;
use crate::types::{PackModule, SourcePackage};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Expand an input selection into the ordered list of inputs to process.
pub fn resolve_inputs(source: &InputSource) -> MergeResult<Vec<PathBuf>> {
    match source {
        InputSource::Dir(dir) => list_input_dir(dir),
        InputSource::Packs(packs) => Ok(packs.clone()),
    }
}

/// Find the pack modules of a package, behavior modules first.
pub async fn discover_modules(package: &SourcePackage) -> MergeResult<Vec<PackModule>> {
    let mut roots = module_roots(&package.root).await?;
    if roots.is_empty() {
        // Look through a single wrapper folder.
        let children: Vec<_> = list_dir(&package.root)
            .await?
            .into_iter()
            .filter(|e| e.is_dir && !e.name.starts_with('.') && e.name != "__MACOSX")
            .collect();
        if let [only] = children.as_slice() {
            roots = module_roots(&only.path).await?;
        }
    }

    if roots.is_empty() {
        return Err(MergeError::parse(
            &package.origin,
            format!("package {} contains no {MANIFEST_FILE}", package.name),
        ));
    }

    let mut modules = Vec::with_capacity(roots.len());
    for (name, root) in roots {
        let manifest = PackManifest::load(&root.join(MANIFEST_FILE)).await?;
        let subdirectories = list_dir(&root)
            .await?
            .into_iter()
            .filter(|e| e.is_dir && !e.name.starts_with('.'))
            .map(|e| e.name)
            .collect();
        modules.push(PackModule {
            name: name.unwrap_or_else(|| package.name.clone()),
            kind: manifest.kind,
            root,
            manifest,
            subdirectories,
        });
    }

    // Stable: ties keep directory-name order.
    modules.sort_by_key(|m| m.kind);
    Ok(modules)
}

/// Module directories directly at or under `dir`.
///
/// The name is `None` when `dir` itself is the module.
async fn module_roots(dir: &Path) -> MergeResult<Vec<(Option<String>, PathBuf)>> {
    if dir.join(MANIFEST_FILE).is_file() {
        return Ok(vec![(None, dir.to_path_buf())]);
    }
    Ok(list_dir(dir)
        .await?
        .into_iter()
        .filter(|e| e.is_dir && e.path.join(MANIFEST_FILE).is_file())
        .map(|e| (Some(e.name), e.path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModuleKind;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, module_type: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join(MANIFEST_FILE),
            format!(r#"{{"header": {{}}, "modules": [{{"type": "{module_type}"}}]}}"#),
        )
        .unwrap();
    }

    fn package(root: &Path) -> SourcePackage {
        SourcePackage {
            name: "Gems".to_string(),
            origin: root.to_path_buf(),
            root: root.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_addon_layout_orders_behavior_first() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("A Resources"), "resources");
        write_manifest(&temp.path().join("Z Behavior"), "data");
        std::fs::create_dir_all(temp.path().join("Z Behavior/blocks")).unwrap();
        std::fs::create_dir_all(temp.path().join("Z Behavior/items")).unwrap();

        let modules = discover_modules(&package(temp.path())).await.unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].kind, ModuleKind::Behavior);
        assert_eq!(modules[0].name, "Z Behavior");
        assert_eq!(modules[0].subdirectories, vec!["blocks", "items"]);
        assert_eq!(modules[1].kind, ModuleKind::Resource);
    }

    #[tokio::test]
    async fn test_single_pack_layout_uses_package_name() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), "resources");
        let modules = discover_modules(&package(temp.path())).await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "Gems");
    }

    #[tokio::test]
    async fn test_wrapper_folder_is_looked_through() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("Gems/BP"), "data");
        let modules = discover_modules(&package(temp.path())).await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "BP");
    }

    #[tokio::test]
    async fn test_package_without_manifest_is_parse_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("stuff")).unwrap();
        let err = discover_modules(&package(temp.path())).await.unwrap_err();
        assert!(err.is_parse_error());
    }
}
