//! Async filesystem helpers used by the orchestrator and strategies.

use crate::error::{IoContext, MergeError, MergeResult};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// An immediate child of a directory.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// List a directory's immediate children, sorted by name.
pub async fn list_dir(dir: &Path) -> MergeResult<Vec<DirEntryInfo>> {
    let mut entries = Vec::new();
    let mut reader = tokio::fs::read_dir(dir).await.at(dir)?;
    while let Some(entry) = reader.next_entry().await.at(dir)? {
        let path = entry.path();
        // metadata() follows symlinks, unlike DirEntry::file_type
        let is_dir = tokio::fs::metadata(&path).await.at(&path)?.is_dir();
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Every non-directory file below `root`, sorted by path.
pub async fn walk_files(root: &Path) -> MergeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in list_dir(&dir).await? {
            if entry.is_dir {
                pending.push(entry.path);
            } else {
                files.push(entry.path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Copy one file, creating parent directories as needed.
pub async fn copy_file(src: &Path, dst: &Path) -> MergeResult<()> {
    if let Some(parent) = dst.parent() {
        tokio::fs::create_dir_all(parent).await.at(parent)?;
    }
    tokio::fs::copy(src, dst).await.at(src)?;
    Ok(())
}

/// Copy the tree under `src` to `dst`; returns the number of files copied.
pub async fn copy_tree(src: &Path, dst: &Path) -> MergeResult<usize> {
    let files = walk_files(src).await?;
    for file in &files {
        let rel = relative(file, src)?;
        copy_file(file, &dst.join(rel)).await?;
    }
    Ok(files.len())
}

/// `path` relative to `base`.
pub fn relative<'a>(path: &'a Path, base: &Path) -> MergeResult<&'a Path> {
    path.strip_prefix(base).map_err(|_| {
        MergeError::internal(format!(
            "{} is not inside {}",
            path.display(),
            base.display()
        ))
    })
}

/// Read a JSON file, tolerating `//` and `/* */` comments.
pub async fn read_json(path: &Path) -> MergeResult<Value> {
    let bytes = tokio::fs::read(path).await.at(path)?;
    let text = String::from_utf8(bytes).map_err(|e| MergeError::parse(path, e))?;
    parse_json(path, &text)
}

/// Parse JSON text for `path`, tolerating comments and a leading BOM.
pub fn parse_json(path: &Path, text: &str) -> MergeResult<Value> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str(&strip_json_comments(text)).map_err(|e| MergeError::parse(path, e))
}

/// Write pretty-printed JSON, creating parent directories as needed.
pub async fn write_json(path: &Path, value: &Value) -> MergeResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(MergeError::internal)?;
    write_text(path, &text).await
}

pub async fn write_text(path: &Path, text: &str) -> MergeResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.at(parent)?;
    }
    tokio::fs::write(path, text).await.at(path)
}

/// Remove `//` and `/* */` comments outside string literals.
///
/// Removed comments are replaced by whitespace (newlines are kept) so that
/// serde_json error positions still line up with the source.
pub fn strip_json_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        out.push(' ');
                        break;
                    }
                    out.push(if skipped == '\n' { '\n' } else { ' ' });
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }

    out
}
