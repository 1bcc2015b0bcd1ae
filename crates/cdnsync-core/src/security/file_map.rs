//! Syntactic validation of untrusted file maps.
//!
//! These checks run before any root is known. They are stricter than the
//! containment check: anything that is not already a plain relative path is
//! rejected.

use crate::security::path::collapse_separators;
use crate::security::path::has_parent_segment;
use crate::security::path::normalize;
use crate::types::FileMap;
use crate::types::FileMapEntry;
use crate::types::LibraryPackage;

/// Returns `true` if `path` is a plain relative path.
///
/// After collapsing repeated separators the path must equal its own lexical
/// normalization and must not contain `..`. Absolute paths, backslashes and
/// null bytes are rejected.
///
/// # Examples
///
/// ```
/// use cdnsync_core::security::is_valid_path;
///
/// assert!(is_valid_path("dist"));
/// assert!(is_valid_path("a//b/"));
/// assert!(is_valid_path("**/*.js"));
/// assert!(!is_valid_path("../secret"));
/// assert!(!is_valid_path("a/./b"));
/// assert!(!is_valid_path("/etc"));
/// ```
#[must_use]
pub fn is_valid_path(path: &str) -> bool {
    if path.contains('\0') || path.contains('\\') {
        return false;
    }
    let collapsed = collapse_separators(path);
    if collapsed.starts_with('/') || has_parent_segment(&collapsed) {
        return false;
    }
    collapsed == normalize(&collapsed)
}

/// Returns `true` if an entry's base path and all of its patterns are valid.
///
/// An empty base path denotes the extraction root and is accepted.
#[must_use]
pub fn is_valid_entry(entry: &FileMapEntry) -> bool {
    (entry.base_path.is_empty() || is_valid_path(&entry.base_path))
        && entry.files.iter().all(|file| is_valid_path(file))
}

/// Returns `true` if every entry of the map is valid.
///
/// # Examples
///
/// ```
/// use cdnsync_core::security::is_valid_file_map;
/// use cdnsync_core::types::FileMap;
/// use cdnsync_core::types::FileMapEntry;
///
/// let ok = FileMap::new(vec![FileMapEntry::new("dist", ["**/*"])]);
/// assert!(is_valid_file_map(&ok));
///
/// let escape = FileMap::new(vec![FileMapEntry::new("/etc", ["passwd"])]);
/// assert!(!is_valid_file_map(&escape));
/// ```
#[must_use]
pub fn is_valid_file_map(file_map: &FileMap) -> bool {
    file_map.iter().all(is_valid_entry)
}

/// Returns the first path in the map that fails validation, if any.
#[must_use]
pub fn first_invalid_path(file_map: &FileMap) -> Option<&str> {
    file_map.iter().find_map(|entry| {
        if !entry.base_path.is_empty() && !is_valid_path(&entry.base_path) {
            return Some(entry.base_path.as_str());
        }
        entry
            .files
            .iter()
            .find(|file| !is_valid_path(file))
            .map(String::as_str)
    })
}

/// A non-fatal style problem in a file map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Index of the offending entry, `None` for map-level issues.
    pub entry: Option<usize>,
    /// Description of the problem.
    pub message: String,
}

/// Checks catalog conventions that do not affect safety.
///
/// - `basePath` has no leading or trailing `/`
/// - file patterns do not end with `**`
#[must_use]
pub fn lint_file_map(file_map: &FileMap) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    for (index, entry) in file_map.iter().enumerate() {
        let base = entry.base_path.as_str();
        if base.starts_with('/') || base.ends_with('/') {
            issues.push(LintIssue {
                entry: Some(index),
                message: format!("basePath {base:?} has a leading or trailing slash"),
            });
        }
        for file in entry.files.iter().filter(|f| f.ends_with("**")) {
            issues.push(LintIssue {
                entry: Some(index),
                message: format!("file pattern {file:?} should not end with **"),
            });
        }
    }
    issues
}

/// Lints a library's metadata: `npmName` and `npmFileMap` must appear
/// together, and a parseable map must pass [`lint_file_map`].
#[must_use]
pub fn lint_package(pkg: &LibraryPackage) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    match (pkg.npm_name().is_some(), pkg.raw_file_map().is_some()) {
        (true, false) => issues.push(LintIssue {
            entry: None,
            message: "npmName is set without npmFileMap".to_string(),
        }),
        (false, true) => issues.push(LintIssue {
            entry: None,
            message: "npmFileMap is set without npmName".to_string(),
        }),
        _ => {}
    }
    if let Some(file_map) = pkg.raw_file_map().and_then(|raw| FileMap::from_value(raw).ok()) {
        issues.extend(lint_file_map(&file_map));
    }
    issues
}
