//! Update operation reporting.

use std::time::Duration;

use crate::error::PathViolation;
use crate::error::ViolationRecord;

/// Report of importing one downloaded version into the catalog.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Number of files copied into the version directory.
    pub files_copied: usize,

    /// Number of matched files that were not copied (skip rules, escapes).
    pub files_skipped: usize,

    /// Patterns that matched nothing.
    pub missing_patterns: Vec<String>,

    /// Path-safety violations found while importing.
    pub violations: Vec<ViolationRecord>,

    /// Whether anything was copied.
    pub updated: bool,

    /// Whether the library's recorded latest version changed.
    pub version_bumped: bool,
}

impl ImportReport {
    /// Creates a new empty import report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn add_violation(&mut self, kind: PathViolation, message: String) {
        self.violations.push(ViolationRecord { kind, message });
    }

    /// Returns whether any violation was recorded.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// What happened to one version of a library.
#[derive(Debug, Clone)]
pub enum VersionOutcome {
    /// The version was downloaded and imported.
    Imported(ImportReport),
    /// The version directory already existed.
    AlreadyPresent,
    /// The source had no tarball; an empty directory was created.
    NotFound,
    /// The version could not be processed.
    Failed(String),
}

/// Report of updating one library.
#[derive(Debug, Clone, Default)]
pub struct LibraryReport {
    /// Catalog name of the library.
    pub name: String,

    /// Outcome per version, in processing order.
    pub versions: Vec<(String, VersionOutcome)>,

    /// Library-level violations (bad name).
    pub violations: Vec<ViolationRecord>,

    /// Set when the library was skipped as a whole.
    pub skipped: Option<String>,
}

impl LibraryReport {
    /// Creates an empty report for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of versions that copied at least one file.
    #[must_use]
    pub fn new_versions(&self) -> usize {
        self.versions
            .iter()
            .filter(|(_, outcome)| matches!(outcome, VersionOutcome::Imported(r) if r.updated))
            .count()
    }

    /// All violations, library-level first, then per imported version.
    pub fn all_violations(&self) -> impl Iterator<Item = &ViolationRecord> {
        self.violations
            .iter()
            .chain(self.versions.iter().flat_map(|(_, outcome)| match outcome {
                VersionOutcome::Imported(report) => report.violations.as_slice(),
                _ => &[][..],
            }))
    }
}

/// Report of a batch run over many libraries.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-library reports, in discovery order.
    pub libraries: Vec<LibraryReport>,

    /// Total number of newly imported versions.
    pub new_versions: usize,

    /// Duration of the run.
    pub duration: Duration,
}

impl BatchReport {
    /// Builds a batch report, folding the new-version count from the
    /// per-library reports.
    #[must_use]
    pub fn from_libraries(libraries: Vec<LibraryReport>, duration: Duration) -> Self {
        let new_versions = libraries.iter().map(LibraryReport::new_versions).sum();
        Self {
            libraries,
            new_versions,
            duration,
        }
    }

    /// Number of violations across all libraries.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.libraries
            .iter()
            .map(|library| library.all_violations().count())
            .sum()
    }
}

/// Callback trait for progress reporting during batch updates.
///
/// Libraries are processed in parallel, so implementations must be `Sync`
/// and callbacks may arrive from several threads and in any order.
pub trait UpdateProgress: Sync {
    /// Called when a library starts processing.
    fn on_library_start(&self, name: &str);

    /// Called when a library has been fully processed.
    fn on_library_complete(&self, report: &LibraryReport);

    /// Called once after every library is done.
    fn on_complete(&self, report: &BatchReport);
}

/// No-op implementation of `UpdateProgress`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl UpdateProgress for NoopProgress {
    fn on_library_start(&self, _name: &str) {}

    fn on_library_complete(&self, _report: &LibraryReport) {}

    fn on_complete(&self, _report: &BatchReport) {}
}
