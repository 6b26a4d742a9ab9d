//! Texture atlas merge.
//!
//! The three atlas index files are merged entry by entry; everything else in
//! the `textures` directory is copied verbatim to `RP/textures`, so texture
//! paths referenced from the indexes keep resolving.
//!
//! The non-`texture_data` fields of `item_texture.json` and
//! `terrain_texture.json` come from the first such file seen; built-in values
//! are only used when no package supplied one.

use crate::error::MergeResult;
use crate::fsutil::{copy_file, read_json, relative, walk_files, write_json};
use crate::hooks::{HookContext, MergeHook, SubDirectory};
use crate::tables::{Claim, FirstWriteTable, Sourced, lock};
use crate::types::ModuleKind;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const FLIPBOOK_FILE: &str = "flipbook_textures.json";
pub const ITEM_TEXTURE_FILE: &str = "item_texture.json";
pub const TERRAIN_TEXTURE_FILE: &str = "terrain_texture.json";
const TEXTURE_DATA_KEY: &str = "texture_data";

type EntryTable = Mutex<FirstWriteTable<Sourced<Value>>>;

#[derive(Default)]
pub struct TextureStrategy {
    flipbooks: EntryTable,
    item_textures: EntryTable,
    terrain_textures: EntryTable,
    /// Atlas file name → header fields of the first file seen.
    atlas_headers: Mutex<FirstWriteTable<Map<String, Value>>>,
    /// Relative texture path → display path of the copied file.
    copied: Mutex<FirstWriteTable<PathBuf>>,
}

impl TextureStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn textures_root(ctx: &HookContext) -> PathBuf {
        ctx.resource_root().join("textures")
    }

    fn atlas_table(&self, file_name: &str) -> (&EntryTable, &'static str) {
        if file_name == TERRAIN_TEXTURE_FILE {
            (&self.terrain_textures, "terrain texture")
        } else {
            (&self.item_textures, "item texture")
        }
    }

    /// Merge `(key, entry)` pairs into `table`, warning on duplicates.
    fn merge_entries(
        ctx: &HookContext,
        table: &EntryTable,
        what: &str,
        source: &Path,
        entries: Vec<(String, Value)>,
    ) {
        for (key, entry) in entries {
            let original = {
                let mut table = lock(table);
                match table.claim(key.clone(), Sourced::new(entry, source)) {
                    Claim::New => None,
                    Claim::Taken(original) => Some(original.source.clone()),
                }
            };
            if let Some(original) = original {
                ctx.duplicate(what, &key, source, &original);
            }
        }
    }

    async fn merge_atlas(
        &self,
        ctx: &HookContext,
        file_name: &'static str,
        file: &Path,
        shown: &Path,
    ) -> MergeResult<()> {
        let doc = read_json(file).await?;
        match split_atlas(&doc) {
            Ok((header, entries)) => {
                lock(&self.atlas_headers).claim(file_name, header);
                let (table, what) = self.atlas_table(file_name);
                Self::merge_entries(ctx, table, what, shown, entries);
            }
            Err(reason) => ctx.manual_merge(shown.display().to_string(), reason),
        }
        Ok(())
    }

    /// Copy a plain texture unless another package already supplied that path.
    async fn copy_texture(
        &self,
        ctx: &HookContext,
        file: &Path,
        rel: &Path,
        shown: &Path,
    ) -> MergeResult<()> {
        let key = rel.to_string_lossy().replace('\\', "/");
        let original = {
            let mut copied = lock(&self.copied);
            match copied.claim(key.clone(), shown.to_path_buf()) {
                Claim::New => None,
                Claim::Taken(original) => Some(original.clone()),
            }
        };
        match original {
            Some(original) => ctx.duplicate("texture file", &key, shown, &original),
            None => copy_file(file, &Self::textures_root(ctx).join(rel)).await?,
        }
        Ok(())
    }

    fn snapshot(table: &EntryTable) -> Vec<(String, Value)> {
        lock(table)
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    /// Header of the first `file_name` seen (or the built-in one) plus `entries`.
    fn atlas_document(&self, file_name: &str, entries: Vec<(String, Value)>) -> Value {
        let mut doc = lock(&self.atlas_headers)
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| default_atlas_header(file_name));
        doc.insert(TEXTURE_DATA_KEY.to_string(), to_object(entries));
        Value::Object(doc)
    }
}

/// Atlas header used when no package supplied one.
fn default_atlas_header(file_name: &str) -> Map<String, Value> {
    let mut header = Map::new();
    header.insert("resource_pack_name".to_string(), json!("vanilla"));
    if file_name == TERRAIN_TEXTURE_FILE {
        header.insert("texture_name".to_string(), json!("atlas.terrain"));
        header.insert("padding".to_string(), json!(8));
        header.insert("num_mip_levels".to_string(), json!(4));
    } else {
        header.insert("texture_name".to_string(), json!("atlas.items"));
    }
    header
}

/// Flipbook entries keyed by `atlas_tile`.
fn flipbook_entries(doc: &Value) -> Result<Vec<(String, Value)>, &'static str> {
    let list = doc.as_array().ok_or("flipbook list is not an array")?;
    list.iter()
        .map(|entry| {
            let tile = entry
                .get("atlas_tile")
                .and_then(Value::as_str)
                .ok_or("flipbook entry has no atlas_tile")?;
            Ok((tile.to_string(), entry.clone()))
        })
        .collect()
}

/// Split an atlas file into its header fields and its `texture_data` entries.
fn split_atlas(doc: &Value) -> Result<(Map<String, Value>, Vec<(String, Value)>), &'static str> {
    let mut header = doc.as_object().cloned().ok_or("atlas file is not a JSON object")?;
    let data = match header.remove(TEXTURE_DATA_KEY) {
        Some(Value::Object(data)) => data,
        _ => return Err("no \"texture_data\" object"),
    };
    Ok((header, data.into_iter().collect()))
}

fn to_object(entries: Vec<(String, Value)>) -> Value {
    Value::Object(entries.into_iter().collect::<Map<String, Value>>())
}

#[async_trait]
impl MergeHook for TextureStrategy {
    fn name(&self) -> &str {
        "textures"
    }

    fn accepts(&self, kind: ModuleKind, name: &str) -> bool {
        kind == ModuleKind::Resource && name == "textures"
    }

    async fn merge_subdirectory(&self, ctx: &HookContext, sub: &SubDirectory) -> MergeResult<bool> {
        if !self.accepts(sub.module_kind, &sub.name) {
            return Ok(false);
        }

        for file in walk_files(&sub.path).await? {
            let rel = relative(&file, &sub.path)?;
            let shown = sub.display_path(&file);

            if rel == Path::new(FLIPBOOK_FILE) {
                let doc = read_json(&file).await?;
                match flipbook_entries(&doc) {
                    Ok(entries) => {
                        Self::merge_entries(ctx, &self.flipbooks, "flipbook texture", &shown, entries)
                    }
                    Err(reason) => ctx.manual_merge(shown.display().to_string(), reason),
                }
            } else if rel == Path::new(ITEM_TEXTURE_FILE) {
                self.merge_atlas(ctx, ITEM_TEXTURE_FILE, &file, &shown).await?;
            } else if rel == Path::new(TERRAIN_TEXTURE_FILE) {
                self.merge_atlas(ctx, TERRAIN_TEXTURE_FILE, &file, &shown).await?;
            } else {
                self.copy_texture(ctx, &file, rel, &shown).await?;
            }
        }

        Ok(true)
    }

    async fn finalize(&self, ctx: &HookContext) -> MergeResult<()> {
        let dest_root = Self::textures_root(ctx);

        let flipbooks = Self::snapshot(&self.flipbooks);
        if !flipbooks.is_empty() {
            let list: Vec<Value> = flipbooks.into_iter().map(|(_, v)| v).collect();
            write_json(&dest_root.join(FLIPBOOK_FILE), &Value::Array(list)).await?;
        }

        for file_name in [ITEM_TEXTURE_FILE, TERRAIN_TEXTURE_FILE] {
            let entries = Self::snapshot(self.atlas_table(file_name).0);
            if !entries.is_empty() {
                let doc = self.atlas_document(file_name, entries);
                write_json(&dest_root.join(file_name), &doc).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergeConfig;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn textures_subdirectory(package: &str, textures: &Path) -> SubDirectory {
        SubDirectory::new(package, "RP", ModuleKind::Resource, "textures", textures.to_path_buf())
    }

    fn write_json_file(path: &Path, doc: &Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string(doc).unwrap()).unwrap();
    }

    fn read_json_file(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_flipbook_entries_keyed_by_tile() {
        let doc = json!([
            {"flipbook_texture": "textures/blocks/lava", "atlas_tile": "lava"},
            {"flipbook_texture": "textures/blocks/water", "atlas_tile": "water"}
        ]);
        let entries = flipbook_entries(&doc).unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["lava", "water"]);
    }

    #[test]
    fn test_flipbook_without_tile_is_rejected() {
        let doc = json!([{"flipbook_texture": "textures/blocks/lava"}]);
        assert_eq!(flipbook_entries(&doc), Err("flipbook entry has no atlas_tile"));
    }

    #[test]
    fn test_split_atlas() {
        let doc = json!({
            "texture_name": "atlas.terrain",
            "texture_data": {"ruby_ore": {"textures": "textures/blocks/ruby_ore"}}
        });
        let (header, entries) = split_atlas(&doc).unwrap();
        assert_eq!(header.get("texture_name"), Some(&json!("atlas.terrain")));
        assert!(!header.contains_key(TEXTURE_DATA_KEY));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "ruby_ore");
        assert!(split_atlas(&json!({})).is_err());
    }

    #[tokio::test]
    async fn test_malformed_atlas_files_become_manual_merges() {
        let temp = TempDir::new().unwrap();
        let textures = temp.path().join("A/textures");
        write_json_file(
            &textures.join(FLIPBOOK_FILE),
            &json!([{"flipbook_texture": "textures/blocks/lava"}]),
        );
        write_json_file(&textures.join(ITEM_TEXTURE_FILE), &json!({"texture_name": "atlas.items"}));

        let strategy = TextureStrategy::new();
        let ctx = HookContext::new(Arc::new(MergeConfig::default()), &temp.path().join("out"));
        let claimed = strategy
            .merge_subdirectory(&ctx, &textures_subdirectory("A", &textures))
            .await
            .unwrap();

        assert!(claimed);
        let subjects: Vec<String> = ctx.log().manual_merges().into_iter().map(|r| r.subject).collect();
        assert_eq!(
            subjects,
            vec![
                format!("A/RP/textures/{FLIPBOOK_FILE}"),
                format!("A/RP/textures/{ITEM_TEXTURE_FILE}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_atlas_header_kept_from_source() {
        let temp = TempDir::new().unwrap();
        let textures = temp.path().join("A/textures");
        let terrain = json!({
            "resource_pack_name": "gems",
            "texture_name": "atlas.terrain",
            "padding": 2,
            "num_mip_levels": 0,
            "texture_data": {"ruby_block": {"textures": "textures/blocks/ruby"}}
        });
        write_json_file(&textures.join(TERRAIN_TEXTURE_FILE), &terrain);

        let out = temp.path().join("out");
        let strategy = TextureStrategy::new();
        let ctx = HookContext::new(Arc::new(MergeConfig::default()), &out);
        strategy
            .merge_subdirectory(&ctx, &textures_subdirectory("A", &textures))
            .await
            .unwrap();
        strategy.finalize(&ctx).await.unwrap();

        assert_eq!(read_json_file(&out.join("RP/textures").join(TERRAIN_TEXTURE_FILE)), terrain);
    }

    #[test]
    fn test_default_header_when_none_supplied() {
        let strategy = TextureStrategy::new();
        let doc = strategy.atlas_document(TERRAIN_TEXTURE_FILE, vec![("a".to_string(), json!({}))]);
        assert_eq!(doc["resource_pack_name"], "vanilla");
        assert_eq!(doc["padding"], 8);
        assert_eq!(doc["num_mip_levels"], 4);
        assert_eq!(doc["texture_data"]["a"], json!({}));
    }

    #[tokio::test]
    async fn test_texture_file_collision_names_both_sources() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("A/textures");
        let b = temp.path().join("B/textures");
        for dir in [&a, &b] {
            std::fs::create_dir_all(dir.join("blocks")).unwrap();
        }
        std::fs::write(a.join("blocks/ruby.png"), "png-a").unwrap();
        std::fs::write(b.join("blocks/ruby.png"), "png-b").unwrap();

        let out = temp.path().join("out");
        let strategy = TextureStrategy::new();
        let ctx = HookContext::new(Arc::new(MergeConfig::default()), &out);
        strategy.merge_subdirectory(&ctx, &textures_subdirectory("A", &a)).await.unwrap();
        strategy.merge_subdirectory(&ctx, &textures_subdirectory("B", &b)).await.unwrap();

        assert_eq!(std::fs::read_to_string(out.join("RP/textures/blocks/ruby.png")).unwrap(), "png-a");
        let warnings = ctx.log().warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("dropped B/RP/textures/blocks/ruby.png"), "{}", warnings[0]);
        assert!(warnings[0].contains("(original: A/RP/textures/blocks/ruby.png)"), "{}", warnings[0]);
    }
}
