//! Core types for packages, modules and merge bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which half of an add-on a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Behavior,
    Resource,
}

impl ModuleKind {
    /// Directory name of this module kind inside the output root.
    pub fn output_dir(&self) -> &'static str {
        match self {
            ModuleKind::Behavior => "BP",
            ModuleKind::Resource => "RP",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Behavior => "behavior",
            ModuleKind::Resource => "resource",
        }
    }

    /// Map a manifest `modules[].type` value to a module kind.
    pub fn from_module_type(module_type: &str) -> Option<Self> {
        match module_type {
            "data" | "script" | "javascript" => Some(ModuleKind::Behavior),
            "resources" => Some(ModuleKind::Resource),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One decompressed input archive.
#[derive(Debug, Clone)]
pub struct SourcePackage {
    /// Derived from the archive file name.
    pub name: String,
    /// The archive (or directory) this package came from.
    pub origin: PathBuf,
    /// Root of the extracted tree.
    pub root: PathBuf,
}

/// A behavior or resource module inside a source package.
#[derive(Debug, Clone)]
pub struct PackModule {
    /// Directory name of the module (the package name for single-module packs).
    pub name: String,
    pub kind: ModuleKind,
    pub root: PathBuf,
    pub manifest: crate::package::PackManifest,
    /// Names of the module's immediate subdirectories, sorted.
    pub subdirectories: Vec<String>,
}

/// Content that could not be merged automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMergeRecord {
    pub subject: String,
    pub reason: String,
}

impl fmt::Display for ManualMergeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.reason)
    }
}
