//! Results of a merge run and of package inspection.

use crate::types::{ManualMergeRecord, ModuleKind};
use serde::Serialize;
use std::path::PathBuf;

/// Terminal report of a completed merge run.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// Package names in processing order.
    pub packages: Vec<String>,
    pub out_dir: PathBuf,
    pub warning_count: usize,
    pub warnings: Vec<String>,
    pub manual_merges: Vec<ManualMergeRecord>,
    pub min_engine_version: String,
    /// RFC 3339 completion time.
    pub generated_at: String,
}

impl MergeReport {
    /// `completed with N warnings`.
    pub fn summary_line(&self) -> String {
        format!("completed with {} warnings", self.warning_count)
    }
}

/// One subdirectory of an inspected module and the strategy that would take it.
#[derive(Debug, Clone, Serialize)]
pub struct SubdirectoryInspection {
    pub name: String,
    /// `None` means nothing claims it and it would need a manual merge.
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleInspection {
    pub name: String,
    pub kind: ModuleKind,
    pub min_engine_version: Option<String>,
    pub script_entry: Option<String>,
    pub dependencies: Vec<String>,
    pub subdirectories: Vec<SubdirectoryInspection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageInspection {
    pub name: String,
    pub origin: PathBuf,
    pub modules: Vec<ModuleInspection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(warning_count: usize) -> MergeReport {
        MergeReport {
            packages: vec![],
            out_dir: PathBuf::from("out"),
            warning_count,
            warnings: vec![],
            manual_merges: vec![],
            min_engine_version: "1.21.50".to_string(),
            generated_at: String::new(),
        }
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(report(0).summary_line(), "completed with 0 warnings");
        assert_eq!(report(7).summary_line(), "completed with 7 warnings");
    }
}
