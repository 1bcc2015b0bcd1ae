//! Output formatter trait for CLI results.

use anyhow::Result;
use cdnsync_core::BatchReport;
use cdnsync_core::ImportReport;
use cdnsync_core::error::ViolationRecord;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the results of checking library metadata
    fn format_check_results(&self, results: &[PackageCheck]) -> Result<()>;

    /// Format a containment verdict
    fn format_containment(&self, result: &ContainmentCheck) -> Result<()>;

    /// Format the result of importing one tarball
    fn format_import_result(
        &self,
        library: &str,
        version: &str,
        report: &ImportReport,
    ) -> Result<()>;

    /// Format the result of a batch update
    fn format_update_result(&self, report: &BatchReport) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Outcome of checking one `package.json`.
#[derive(Debug, Serialize)]
pub struct PackageCheck {
    pub path: String,
    pub library: String,
    pub valid: bool,
    pub errors: Vec<String>,
    pub violations: Vec<ViolationRecord>,
    pub lints: Vec<String>,
}

/// Verdict for one containment query.
#[derive(Debug, Serialize)]
pub struct ContainmentCheck {
    pub root: String,
    pub contained: bool,
    pub candidates: Vec<CandidateVerdict>,
}

#[derive(Debug, Serialize)]
pub struct CandidateVerdict {
    pub path: String,
    pub contained: bool,
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    /// Failed operation that still carries its result data.
    pub fn failure(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}
