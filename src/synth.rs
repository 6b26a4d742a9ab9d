//! Output manifest synthesis.
//!
//! Builds `BP/manifest.json` and `RP/manifest.json` from the reconciled run
//! state, plus the generated script entry file when any package brought
//! scripts.

use crate::error::MergeResult;
use crate::fsutil::{write_json, write_text};
use crate::versions::VersionState;
use serde_json::{Value, json};
use std::path::Path;
use uuid::Uuid;

pub const MERGED_PACK_NAME: &str = "Merged Pack";
/// Generated script entry, relative to the behavior pack root.
pub const SCRIPT_ENTRY: &str = "scripts/index.js";
const PACK_VERSION: [u32; 3] = [1, 0, 0];

/// A package's declared script entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub package: String,
    /// As declared in the manifest, e.g. `scripts/main.js`.
    pub entry: String,
}

impl ScriptEntry {
    /// Import path of the relocated entry, relative to [`SCRIPT_ENTRY`].
    pub fn import_path(&self) -> String {
        let entry = self.entry.replace('\\', "/");
        let entry = entry.trim_start_matches("./");
        let within_scripts = entry.strip_prefix("scripts/").unwrap_or(entry);
        format!("./{}/{}", self.package, within_scripts)
    }
}

/// Everything the synthesizer needs from a finished run.
#[derive(Debug, Clone, Copy)]
pub struct SynthInput<'a> {
    pub packages: &'a [String],
    pub versions: &'a VersionState,
    pub scripts: &'a [ScriptEntry],
}

/// The two synthesized manifests.
#[derive(Debug, Clone)]
pub struct SynthesizedManifests {
    pub behavior: Value,
    pub resource: Value,
}

/// Source of the generated entry file: one import per contributing package.
pub fn script_entry_source(scripts: &[ScriptEntry]) -> String {
    scripts
        .iter()
        .map(|s| format!("import \"{}\";\n", s.import_path()))
        .collect()
}

fn header(input: &SynthInput<'_>, uuid: &Uuid) -> Value {
    json!({
        "name": MERGED_PACK_NAME,
        "description": format!("Merged from: {}", input.packages.join(", ")),
        "min_engine_version": input.versions.min_engine_version().to_value(),
        "uuid": uuid.to_string(),
        "version": PACK_VERSION,
    })
}

/// Build both manifests with freshly generated identities.
pub fn build_manifests(input: SynthInput<'_>) -> SynthesizedManifests {
    let behavior_uuid = Uuid::new_v4();
    let resource_uuid = Uuid::new_v4();

    let mut behavior_modules = vec![json!({
        "type": "data",
        "uuid": Uuid::new_v4().to_string(),
        "version": PACK_VERSION,
    })];
    if !input.scripts.is_empty() {
        behavior_modules.push(json!({
            "type": "script",
            "language": "javascript",
            "uuid": Uuid::new_v4().to_string(),
            "version": PACK_VERSION,
            "entry": SCRIPT_ENTRY,
        }));
    }

    let mut behavior_deps = vec![json!({
        "uuid": resource_uuid.to_string(),
        "version": PACK_VERSION,
    })];
    behavior_deps.extend(input.versions.dependencies().iter().map(|(name, version)| {
        json!({
            "module_name": name,
            "version": version.to_string(),
        })
    }));

    let behavior = json!({
        "format_version": 2,
        "header": header(&input, &behavior_uuid),
        "modules": behavior_modules,
        "dependencies": behavior_deps,
    });

    let resource = json!({
        "format_version": 2,
        "header": header(&input, &resource_uuid),
        "modules": [{
            "type": "resources",
            "uuid": Uuid::new_v4().to_string(),
            "version": PACK_VERSION,
        }],
        "dependencies": [{
            "uuid": behavior_uuid.to_string(),
            "version": PACK_VERSION,
        }],
    });

    SynthesizedManifests { behavior, resource }
}

/// Write both manifests and, if needed, the script entry file.
pub async fn write_outputs(
    behavior_root: &Path,
    resource_root: &Path,
    input: SynthInput<'_>,
) -> MergeResult<SynthesizedManifests> {
    let manifests = build_manifests(input);
    write_json(&behavior_root.join("manifest.json"), &manifests.behavior).await?;
    write_json(&resource_root.join("manifest.json"), &manifests.resource).await?;

    if !input.scripts.is_empty() {
        write_text(
            &behavior_root.join(SCRIPT_ENTRY),
            &script_entry_source(input.scripts),
        )
        .await?;
    }
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::EngineVersion;
    use semver::Version;

    fn entry(package: &str, entry: &str) -> ScriptEntry {
        ScriptEntry {
            package: package.to_string(),
            entry: entry.to_string(),
        }
    }

    #[test]
    fn test_import_path_relativized_under_scripts() {
        assert_eq!(entry("Gems", "scripts/main.js").import_path(), "./Gems/main.js");
        assert_eq!(
            entry("Tools", "./scripts/src/index.js").import_path(),
            "./Tools/src/index.js"
        );
    }

    #[test]
    fn test_script_entry_source_one_line_per_package() {
        let source = script_entry_source(&[entry("A", "scripts/main.js"), entry("B", "scripts/b.js")]);
        assert_eq!(source, "import \"./A/main.js\";\nimport \"./B/b.js\";\n");
    }

    #[test]
    fn test_manifests_cross_link_and_carry_versions() {
        let mut versions = VersionState::new();
        versions.observe_engine(EngineVersion::new(1, 21, 70));
        versions.observe_dependency("@minecraft/server", Version::new(1, 3, 0));
        let packages = vec!["A".to_string(), "B".to_string()];
        let scripts = vec![entry("A", "scripts/main.js")];

        let manifests = build_manifests(SynthInput {
            packages: &packages,
            versions: &versions,
            scripts: &scripts,
        });
        let bp = &manifests.behavior;
        let rp = &manifests.resource;

        assert_eq!(bp["format_version"], 2);
        assert_eq!(bp["header"]["min_engine_version"], json!([1, 21, 70]));
        assert_eq!(bp["header"]["description"], "Merged from: A, B");
        assert_eq!(bp["modules"][0]["type"], "data");
        assert_eq!(bp["modules"][1]["type"], "script");
        assert_eq!(bp["modules"][1]["entry"], SCRIPT_ENTRY);

        assert_eq!(bp["dependencies"][0]["uuid"], rp["header"]["uuid"]);
        assert_eq!(rp["dependencies"][0]["uuid"], bp["header"]["uuid"]);
        assert_eq!(bp["dependencies"][1]["module_name"], "@minecraft/server");
        assert_eq!(bp["dependencies"][1]["version"], "1.3.0");
        assert_eq!(rp["modules"][0]["type"], "resources");
        assert_ne!(bp["header"]["uuid"], rp["header"]["uuid"]);
    }

    #[test]
    fn test_no_script_module_without_scripts() {
        let versions = VersionState::new();
        let manifests = build_manifests(SynthInput {
            packages: &["A".to_string()],
            versions: &versions,
            scripts: &[],
        });
        let modules = manifests.behavior["modules"].as_array().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(manifests.behavior["header"]["min_engine_version"], json!([1, 21, 50]));
    }
}
