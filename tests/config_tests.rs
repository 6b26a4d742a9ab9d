//! Integration tests for configuration loading feeding a merge run.
//!
//! Tests that tiered configuration (project file, environment) resolves into
//! a runnable `MergeConfig`.

use pack_merger::MergeRun;
use pack_merger::config::{ConfigLoader, ConfigPaths, ConfigTier, InputSource};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a ConfigLoader with specific temp directories and no environment.
fn create_loader_with_dirs(project_dir: &Path, user_dir: &Path) -> ConfigLoader {
    let paths = ConfigPaths::with_dirs(Some(project_dir.to_path_buf()), Some(user_dir.to_path_buf()));
    ConfigLoader::load_with_env(paths, |_| None).expect("Failed to create config loader")
}

/// A single-pack package with an empty behavior manifest.
fn minimal_package(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("manifest.json"),
        r#"{
            // comments are allowed in manifests
            "format_version": 2,
            "header": {"name": "Tiny", "min_engine_version": [1, 21, 60]},
            "modules": [{"type": "data"}]
        }"#,
    )
    .unwrap();
}

#[tokio::test]
async fn test_project_config_drives_merge() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let user = temp.path().join("user");
    fs::create_dir_all(&project).unwrap();
    minimal_package(&temp.path().join("packs/Tiny"));

    let yaml = format!(
        "input:\n  dir: {}\noutDir: {}\n",
        temp.path().join("packs").display(),
        temp.path().join("merged").display()
    );
    fs::write(project.join("pack-merger.yaml"), yaml).unwrap();

    let loader = create_loader_with_dirs(&project, &user);
    assert_eq!(loader.sources()[0].0, ConfigTier::Project);
    assert!(matches!(
        loader.config().input_source().unwrap(),
        InputSource::Dir(_)
    ));

    let report = MergeRun::new(loader.into_config())
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(report.packages, vec!["Tiny"]);
    assert_eq!(report.min_engine_version, "1.21.60");
    assert!(temp.path().join("merged/BP/manifest.json").is_file());
    assert!(temp.path().join("merged/RP/manifest.json").is_file());
}

#[test]
fn test_env_input_dir_replaces_configured_packs() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("pack-merger.yaml"),
        "input:\n  packs: [a.mcaddon]\noutDir: out\n",
    )
    .unwrap();

    let paths = ConfigPaths::with_dirs(Some(temp.path().to_path_buf()), None);
    let env = |key: &str| (key == "PACK_MERGER_INPUT_DIR").then(|| "from-env".to_string());
    let loader = ConfigLoader::load_with_env(paths, env).unwrap();

    assert_eq!(
        loader.config().input_source().unwrap(),
        InputSource::Dir("from-env".into())
    );
}

#[test]
fn test_conflicting_tiers_fail_validation() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let user = temp.path().join("user");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(&user).unwrap();
    fs::write(user.join("config.yaml"), "input:\n  dir: packs\n").unwrap();
    fs::write(project.join("pack-merger.yaml"), "input:\n  packs: [a.mcaddon]\noutDir: out\n").unwrap();

    let loader = create_loader_with_dirs(&project, &user);
    let err = MergeRun::new(loader.into_config()).err().unwrap();
    assert!(err.to_string().contains("mutually exclusive"));
}
