//! Identifier-keyed merge for blocks, entities, items and recipes.
//!
//! Each content file has one top-level `minecraft:*` key whose
//! `description.identifier` names the content. The first file registered for
//! an identifier is copied to `BP/<category>/<package>/...`; later ones are
//! dropped.

use crate::error::{MergeError, MergeResult};
use crate::fsutil::{copy_file, read_json, relative, walk_files};
use crate::hooks::{HookContext, MergeHook, SubDirectory};
use crate::tables::{Claim, IdentifierRegistry, lock};
use crate::types::ModuleKind;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Namespace prefix of the root key in every content file.
pub const RESERVED_PREFIX: &str = "minecraft:";

/// Behavior-pack categories merged by identifier.
pub const IDENTIFIER_CATEGORIES: &[&str] = &["blocks", "entities", "items", "recipes"];

/// Extract `description.identifier` from the single `minecraft:*` root key.
pub fn content_identifier(path: &Path, doc: &Value) -> MergeResult<String> {
    let object = doc
        .as_object()
        .ok_or_else(|| MergeError::parse(path, "content file is not a JSON object"))?;

    let mut roots = object.iter().filter(|(k, _)| k.starts_with(RESERVED_PREFIX));
    let (root_key, root) = roots.next().ok_or_else(|| {
        MergeError::parse(path, format!("no top-level \"{RESERVED_PREFIX}*\" key"))
    })?;
    if let Some((other, _)) = roots.next() {
        return Err(MergeError::parse(
            path,
            format!("ambiguous root keys \"{root_key}\" and \"{other}\""),
        ));
    }

    root.pointer("/description/identifier")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            MergeError::parse(path, format!("\"{root_key}\" has no description.identifier"))
        })
}

/// Strategy for one identifier-keyed category.
pub struct IdentifierStrategy {
    category: &'static str,
    registry: Mutex<IdentifierRegistry>,
}

impl IdentifierStrategy {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            registry: Mutex::new(IdentifierRegistry::new()),
        }
    }

    /// Singular noun for messages: `blocks` → `block`, `entities` → `entity`.
    fn noun(&self) -> &str {
        match self.category {
            "entities" => "entity",
            other => other.strip_suffix('s').unwrap_or(other),
        }
    }
}

#[async_trait]
impl MergeHook for IdentifierStrategy {
    fn name(&self) -> &str {
        self.category
    }

    fn accepts(&self, kind: ModuleKind, name: &str) -> bool {
        kind == ModuleKind::Behavior && name == self.category
    }

    async fn merge_subdirectory(&self, ctx: &HookContext, sub: &SubDirectory) -> MergeResult<bool> {
        if !self.accepts(sub.module_kind, &sub.name) {
            return Ok(false);
        }

        let dest_root = ctx
            .module_root(sub.module_kind)
            .join(self.category)
            .join(&sub.package);
        if dest_root.exists() {
            return Err(MergeError::DestinationExists(dest_root));
        }

        let mut copied = 0usize;
        for file in walk_files(&sub.path).await? {
            let shown = sub.display_path(&file);
            if file.extension().is_none_or(|ext| ext != "json") {
                ctx.manual_merge(
                    shown.display().to_string(),
                    format!("unsupported file in {} directory", self.category),
                );
                continue;
            }

            let doc = read_json(&file).await?;
            let identifier = content_identifier(&file, &doc)?;

            // Scope the guard so it is released before the copy is awaited.
            let original = {
                let mut registry = lock(&self.registry);
                match registry.claim(identifier.clone(), shown.clone()) {
                    Claim::New => None,
                    Claim::Taken(original) => Some(original.clone()),
                }
            };

            match original {
                None => {
                    copy_file(&file, &dest_root.join(relative(&file, &sub.path)?)).await?;
                    copied += 1;
                }
                Some(original) => ctx.duplicate(self.noun(), &identifier, &shown, &original),
            }
        }

        debug!(subdirectory = %sub.display_name, copied, "Merged {}", self.category);
        Ok(true)
    }
}
