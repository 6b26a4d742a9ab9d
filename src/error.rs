//! Structured error types for merge runs.
//!
//! Only conditions that abort a run are errors. Everything recoverable
//! (duplicates, unsupported content, version drift) is reported through
//! [`crate::hooks::HookContext`] instead.

use std::fmt;
use std::path::{Path, PathBuf};

/// Fatal errors that abort a merge run.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    // Setup errors
    #[error("output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("destination directory already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("two inputs resolve to the same package name: {0}")]
    DuplicatePackageName(String),

    #[error("failed to extract {}: {reason}", archive.display())]
    Extract { archive: PathBuf, reason: String },

    // Structural errors
    #[error("malformed file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    // Internal errors
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl MergeError {
    pub fn parse(path: &Path, reason: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn extract(archive: &Path, reason: impl fmt::Display) -> Self {
        Self::Extract {
            archive: archive.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// True for output collisions and extraction failures.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            MergeError::OutputExists(_)
                | MergeError::DestinationExists(_)
                | MergeError::DuplicatePackageName(_)
                | MergeError::Extract { .. }
        )
    }

    /// True when an input file is missing required structure.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, MergeError::Parse { .. })
    }
}

/// Attach a path to a raw I/O result.
pub trait IoContext<T> {
    fn at(self, path: &Path) -> MergeResult<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> MergeResult<T> {
        self.map_err(|e| MergeError::io(path, e))
    }
}

/// Result type for merge operations.
pub type MergeResult<T> = std::result::Result<T, MergeError>;
