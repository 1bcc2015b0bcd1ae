//! JSON output formatter for machine-readable results.

use super::formatter::ContainmentCheck;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::PackageCheck;
use anyhow::Result;
use cdnsync_core::BatchReport;
use cdnsync_core::ImportReport;
use cdnsync_core::VersionOutcome;
use cdnsync_core::error::ViolationRecord;
use serde::Serialize;
use std::io::Write;
use std::io;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    library: &'a str,
    version: &'a str,
    files_copied: usize,
    files_skipped: usize,
    missing_patterns: &'a [String],
    version_bumped: bool,
    violations: &'a [ViolationRecord],
}

impl<'a> ImportOutput<'a> {
    fn new(library: &'a str, version: &'a str, report: &'a ImportReport) -> Self {
        Self {
            library,
            version,
            files_copied: report.files_copied,
            files_skipped: report.files_skipped,
            missing_patterns: &report.missing_patterns,
            version_bumped: report.version_bumped,
            violations: &report.violations,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum VersionOutput<'a> {
    Imported {
        version: &'a str,
        files_copied: usize,
        files_skipped: usize,
        version_bumped: bool,
    },
    AlreadyPresent {
        version: &'a str,
    },
    NotFound {
        version: &'a str,
    },
    Failed {
        version: &'a str,
        error: &'a str,
    },
}

impl<'a> VersionOutput<'a> {
    fn new(version: &'a str, outcome: &'a VersionOutcome) -> Self {
        match outcome {
            VersionOutcome::Imported(report) => Self::Imported {
                version,
                files_copied: report.files_copied,
                files_skipped: report.files_skipped,
                version_bumped: report.version_bumped,
            },
            VersionOutcome::AlreadyPresent => Self::AlreadyPresent { version },
            VersionOutcome::NotFound => Self::NotFound { version },
            VersionOutcome::Failed(error) => Self::Failed { version, error },
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_check_results(&self, results: &[PackageCheck]) -> Result<()> {
        let rejected = results.iter().filter(|r| !r.valid).count();
        let output = if rejected == 0 {
            JsonOutput::success("check", results)
        } else {
            JsonOutput::failure("check", results, format!("{rejected} package(s) rejected"))
        };
        Self::output(&output)
    }

    fn format_containment(&self, result: &ContainmentCheck) -> Result<()> {
        let output = if result.contained {
            JsonOutput::success("contains", result)
        } else {
            JsonOutput::failure("contains", result, "path escapes root")
        };
        Self::output(&output)
    }

    fn format_import_result(
        &self,
        library: &str,
        version: &str,
        report: &ImportReport,
    ) -> Result<()> {
        let output = JsonOutput::success("import", ImportOutput::new(library, version, report));
        Self::output(&output)
    }

    fn format_update_result(&self, report: &BatchReport) -> Result<()> {
        #[derive(Serialize)]
        struct LibraryOutput<'a> {
            name: &'a str,
            new_versions: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            skipped: Option<&'a str>,
            versions: Vec<VersionOutput<'a>>,
            violations: Vec<&'a ViolationRecord>,
        }

        #[derive(Serialize)]
        struct UpdateOutput<'a> {
            new_versions: usize,
            violation_count: usize,
            duration_ms: u128,
            libraries: Vec<LibraryOutput<'a>>,
        }

        let data = UpdateOutput {
            new_versions: report.new_versions,
            violation_count: report.violation_count(),
            duration_ms: report.duration.as_millis(),
            libraries: report
                .libraries
                .iter()
                .map(|library| LibraryOutput {
                    name: &library.name,
                    new_versions: library.new_versions(),
                    skipped: library.skipped.as_deref(),
                    versions: library
                        .versions
                        .iter()
                        .map(|(version, outcome)| VersionOutput::new(version, outcome))
                        .collect(),
                    violations: library.all_violations().collect(),
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("update", data))
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
