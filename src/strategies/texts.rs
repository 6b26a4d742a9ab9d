//! Translation merge.
//!
//! `.lang` files are line based: `key=value`, with blank lines and `##`
//! comment lines ignored. Keys are merged per language and written during
//! finalization as `RP/texts/<lang>.lang` plus `RP/texts/languages.json`.

use crate::error::{IoContext, MergeResult};
use crate::fsutil::{list_dir, write_json, write_text};
use crate::hooks::{HookContext, MergeHook, SubDirectory};
use crate::tables::{Claim, Sourced, TranslationTable, lock};
use crate::types::ModuleKind;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Mutex;

pub const LANGUAGES_FILE: &str = "languages.json";

/// Pack metadata keys that never carry over into the merged pack.
const PACK_METADATA_KEYS: &[&str] = &["pack.name", "pack.description"];

/// Parse `.lang` text into `(key, value)` pairs, in file order.
///
/// Lines without `=` are skipped. Pack metadata keys are dropped.
pub fn parse_lang(text: &str) -> Vec<(String, String)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with("##"))
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !PACK_METADATA_KEYS.contains(&key.trim()))
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .collect()
}

#[derive(Default)]
pub struct TranslationStrategy {
    table: Mutex<TranslationTable>,
}

impl TranslationStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn merge_lang(&self, ctx: &HookContext, language: &str, source: &Path, text: &str) {
        lock(&self.table).touch_language(language);
        for (key, value) in parse_lang(text) {
            let original = {
                let mut table = lock(&self.table);
                match table.claim(language, &key, Sourced::new(value.clone(), source)) {
                    Claim::New => None,
                    Claim::Taken(original) => Some(original.source.clone()),
                }
            };
            if let Some(original) = original {
                ctx.duplicate("translation key", &format!("{language}:{key}"), source, &original);
            }
        }
    }
}

#[async_trait]
impl MergeHook for TranslationStrategy {
    fn name(&self) -> &str {
        "texts"
    }

    fn accepts(&self, _kind: ModuleKind, name: &str) -> bool {
        name == "texts"
    }

    async fn merge_subdirectory(&self, ctx: &HookContext, sub: &SubDirectory) -> MergeResult<bool> {
        if !self.accepts(sub.module_kind, &sub.name) {
            return Ok(false);
        }

        for entry in list_dir(&sub.path).await? {
            let shown = sub.display_path(&entry.path);
            if entry.is_dir {
                ctx.manual_merge(
                    shown.display().to_string(),
                    "nested directories are not supported in texts",
                );
                continue;
            }
            if entry.name == LANGUAGES_FILE {
                continue;
            }
            let Some(language) = entry.name.strip_suffix(".lang") else {
                ctx.manual_merge(
                    shown.display().to_string(),
                    "unsupported file in texts directory",
                );
                continue;
            };

            let bytes = tokio::fs::read(&entry.path).await.at(&entry.path)?;
            match String::from_utf8(bytes) {
                Ok(text) => self.merge_lang(ctx, language, &shown, &text),
                Err(_) => ctx.manual_merge(
                    shown.display().to_string(),
                    "translation file is not valid UTF-8",
                ),
            }
        }

        Ok(true)
    }

    async fn finalize(&self, ctx: &HookContext) -> MergeResult<()> {
        let (files, languages) = {
            let table = lock(&self.table);
            if table.is_empty() {
                return Ok(());
            }
            let mut files = Vec::new();
            for (language, entries) in table.entries() {
                let mut text = String::new();
                for (key, value) in entries.iter() {
                    let _ = writeln!(text, "{key}={}", value.value);
                }
                files.push((format!("{language}.lang"), text));
            }
            let languages: Vec<Value> = table.languages().map(|l| Value::from(l.as_str())).collect();
            (files, languages)
        };

        let texts_root = ctx.resource_root().join("texts");
        for (name, text) in &files {
            write_text(&texts_root.join(name), text).await?;
        }
        write_json(&texts_root.join(LANGUAGES_FILE), &Value::Array(languages)).await?;
        Ok(())
    }
}
