//! Logging setup and the per-run message log.
//!
//! Messages emitted during a merge go to two places:
//! 1. tracing (stderr/stdout/file, configured by the binary)
//! 2. an in-memory [`RunLog`] that feeds the final report
//!
//! Warnings and manual-merge records are always kept in the run log;
//! informational messages only go to tracing.

use crate::types::ManualMergeRecord;
use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Destination for tracing output, parsed from `--log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    /// Append to a file, without ANSI colours.
    File(PathBuf),
}

impl LogTarget {
    /// Parse `0|off`, `1|stdout`, `2|stderr`, or a file name.
    pub fn parse(value: &str) -> Self {
        match value {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        }
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing(target: &LogTarget, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

/// Warnings and manual-merge records collected during one run.
///
/// Shared by concurrently running strategies; each list has its own lock.
#[derive(Debug, Default)]
pub struct RunLog {
    warnings: Mutex<Vec<String>>,
    manual_merges: Mutex<Vec<ManualMergeRecord>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning and count it.
    pub fn warning(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        crate::tables::lock(&self.warnings).push(message);
    }

    /// Log an informational message.
    pub fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    /// Record content that needs a human to merge it.
    pub fn manual_merge(&self, subject: impl Into<String>, reason: impl Into<String>) {
        let record = ManualMergeRecord {
            subject: subject.into(),
            reason: reason.into(),
        };
        tracing::warn!(subject = %record.subject, "Manual merge required: {}", record.reason);
        crate::tables::lock(&self.manual_merges).push(record);
    }

    pub fn warning_count(&self) -> usize {
        crate::tables::lock(&self.warnings).len()
    }

    pub fn warnings(&self) -> Vec<String> {
        crate::tables::lock(&self.warnings).clone()
    }

    pub fn manual_merges(&self) -> Vec<ManualMergeRecord> {
        crate::tables::lock(&self.manual_merges).clone()
    }
}
