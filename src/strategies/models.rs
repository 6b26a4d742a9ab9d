//! Geometry model merge.
//!
//! Only `format_version` 1.12.0 geometry files are understood. Their
//! geometries are pooled by identifier and written once, during
//! finalization, to `RP/models/merged.geo.json`.

use crate::error::MergeResult;
use crate::fsutil::{read_json, walk_files, write_json};
use crate::hooks::{HookContext, MergeHook, SubDirectory};
use crate::tables::{Claim, FirstWriteTable, Sourced, lock};
use crate::types::ModuleKind;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;

pub const SUPPORTED_GEOMETRY_FORMAT: &str = "1.12.0";
pub const GEOMETRY_KEY: &str = "minecraft:geometry";
pub const MERGED_GEOMETRY_FILE: &str = "merged.geo.json";

#[derive(Default)]
pub struct ModelStrategy {
    geometries: Mutex<FirstWriteTable<Sourced<Value>>>,
}

impl ModelStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MergeHook for ModelStrategy {
    fn name(&self) -> &str {
        "models"
    }

    fn accepts(&self, kind: ModuleKind, name: &str) -> bool {
        kind == ModuleKind::Resource && name == "models"
    }

    async fn merge_subdirectory(&self, ctx: &HookContext, sub: &SubDirectory) -> MergeResult<bool> {
        if !self.accepts(sub.module_kind, &sub.name) {
            return Ok(false);
        }

        for file in walk_files(&sub.path).await? {
            let shown = sub.display_path(&file);
            let subject = shown.display().to_string();
            if file.extension().is_none_or(|ext| ext != "json") {
                ctx.manual_merge(subject, "unsupported file in models directory");
                continue;
            }

            let doc = read_json(&file).await?;
            let version = doc.get("format_version").and_then(Value::as_str);
            if version != Some(SUPPORTED_GEOMETRY_FORMAT) {
                let shown_version = version.unwrap_or("(missing)");
                ctx.manual_merge(
                    subject,
                    format!("unsupported geometry format version {shown_version}"),
                );
                continue;
            }

            let Some(geometries) = doc.get(GEOMETRY_KEY).and_then(Value::as_array) else {
                ctx.manual_merge(subject, format!("no \"{GEOMETRY_KEY}\" array"));
                continue;
            };

            for geometry in geometries {
                let Some(identifier) = geometry
                    .pointer("/description/identifier")
                    .and_then(Value::as_str)
                else {
                    ctx.manual_merge(subject.clone(), "geometry has no description.identifier");
                    continue;
                };

                let original = {
                    let mut table = lock(&self.geometries);
                    match table.claim(identifier, Sourced::new(geometry.clone(), &shown)) {
                        Claim::New => None,
                        Claim::Taken(original) => Some(original.source.clone()),
                    }
                };
                if let Some(original) = original {
                    ctx.duplicate("geometry", identifier, &shown, &original);
                }
            }
        }

        Ok(true)
    }

    async fn finalize(&self, ctx: &HookContext) -> MergeResult<()> {
        let geometries: Vec<Value> = {
            let table = lock(&self.geometries);
            table.values().map(|g| g.value.clone()).collect()
        };
        if geometries.is_empty() {
            return Ok(());
        }

        let path = ctx.resource_root().join("models").join(MERGED_GEOMETRY_FILE);
        write_json(
            &path,
            &json!({
                "format_version": SUPPORTED_GEOMETRY_FORMAT,
                GEOMETRY_KEY: geometries,
            }),
        )
        .await?;
        ctx.info(&format!("Wrote {} geometries to {}", geometries.len(), path.display()));
        Ok(())
    }
}
