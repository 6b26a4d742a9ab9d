//! Output formatting for merge reports and package inspections.

use crate::report::{MergeReport, PackageInspection};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format '{}'. Valid options: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Render a finished merge.
pub fn format_report(report: &MergeReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Text => format_report_text(report),
    }
}

fn format_report_text(report: &MergeReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Merged {} package(s) into {}\n",
        report.packages.len(),
        report.out_dir.display()
    ));
    for name in &report.packages {
        out.push_str(&format!("  - {}\n", name));
    }
    out.push_str(&format!("Minimum engine version: {}\n", report.min_engine_version));

    if !report.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  ! {}\n", warning));
        }
    }

    if !report.manual_merges.is_empty() {
        out.push_str("\nNeeds manual merge:\n");
        for record in &report.manual_merges {
            out.push_str(&format!("  ? {}\n", record));
        }
    }

    out.push_str(&format!("\n{}\n", report.summary_line()));
    out
}

/// Render the result of `inspect`.
pub fn format_inspection(packages: &[PackageInspection], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(packages),
        OutputFormat::Text => format_inspection_text(packages),
    }
}

fn format_inspection_text(packages: &[PackageInspection]) -> String {
    let mut out = String::new();

    for package in packages {
        out.push_str(&format!("{} ({})\n", package.name, package.origin.display()));
        for module in &package.modules {
            out.push_str(&format!("  {} [{}]", module.name, module.kind));
            if let Some(ref version) = module.min_engine_version {
                out.push_str(&format!(" min_engine_version {}", version));
            }
            out.push('\n');

            if let Some(ref entry) = module.script_entry {
                out.push_str(&format!("    script entry: {}\n", entry));
            }
            if !module.dependencies.is_empty() {
                out.push_str(&format!("    depends on: {}\n", module.dependencies.join(", ")));
            }
            for sub in &module.subdirectories {
                let strategy = sub.strategy.as_deref().unwrap_or("manual merge");
                out.push_str(&format!("    {}/ -> {}\n", sub.name, strategy));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ModuleInspection, SubdirectoryInspection};
    use crate::types::{ManualMergeRecord, ModuleKind};
    use std::path::PathBuf;

    fn sample_report() -> MergeReport {
        MergeReport {
            packages: vec!["A".to_string(), "B".to_string()],
            out_dir: PathBuf::from("out"),
            warning_count: 1,
            warnings: vec!["Duplicate block 'x:ruby': dropped B (original: A)".to_string()],
            manual_merges: vec![ManualMergeRecord {
                subject: "B/bp/functions".to_string(),
                reason: "subdirectory could not be merged".to_string(),
            }],
            min_engine_version: "1.21.70".to_string(),
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_report_text_sections() {
        let text = format_report(&sample_report(), OutputFormat::Text);
        assert!(text.starts_with("Merged 2 package(s) into out\n"));
        assert!(text.contains("Minimum engine version: 1.21.70"));
        assert!(text.contains("! Duplicate block 'x:ruby'"));
        assert!(text.contains("? B/bp/functions"));
        assert!(text.trim_end().ends_with("completed with 1 warnings"));
    }

    #[test]
    fn test_report_json_is_structured() {
        let json = format_report(&sample_report(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["warning_count"], 1);
        assert_eq!(value["packages"][1], "B");
        assert_eq!(value["manual_merges"][0]["subject"], "B/bp/functions");
    }

    #[test]
    fn test_inspection_text_marks_unclaimed() {
        let packages = vec![PackageInspection {
            name: "A".to_string(),
            origin: PathBuf::from("A.mcaddon"),
            modules: vec![ModuleInspection {
                name: "bp".to_string(),
                kind: ModuleKind::Behavior,
                min_engine_version: Some("1.21.50".to_string()),
                script_entry: None,
                dependencies: vec![],
                subdirectories: vec![
                    SubdirectoryInspection {
                        name: "blocks".to_string(),
                        strategy: Some("blocks".to_string()),
                    },
                    SubdirectoryInspection {
                        name: "functions".to_string(),
                        strategy: None,
                    },
                ],
            }],
        }];

        let text = format_inspection(&packages, OutputFormat::Text);
        assert!(text.contains("A (A.mcaddon)"));
        assert!(text.contains("bp [behavior] min_engine_version 1.21.50"));
        assert!(text.contains("blocks/ -> blocks"));
        assert!(text.contains("functions/ -> manual merge"));
    }
}
