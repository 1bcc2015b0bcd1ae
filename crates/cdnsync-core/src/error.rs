//! Error types for library update operations.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `UpdateError`.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Kind of path-safety violation found while processing a library.
///
/// Serialized as the bare variant name so that reports read
/// `{"kind": "BadFilePath", ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PathViolation {
    /// A base path, file pattern or resolved file escapes its allowed root.
    BadFilePath,
    /// The library identifier itself contains a traversal segment.
    BadPackageName,
}

impl std::fmt::Display for PathViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadFilePath => f.write_str("BadFilePath"),
            Self::BadPackageName => f.write_str("BadPackageName"),
        }
    }
}

/// A violation as it appears in reports: a kind tag plus a human message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationRecord {
    /// Violation kind.
    pub kind: PathViolation,
    /// Human readable description.
    pub message: String,
}

/// Errors that can occur while updating a library.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file pattern is not a valid glob.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Library name contains a parent directory traversal or is absolute.
    #[error("{name} has a malicious package name")]
    BadPackageName {
        /// The offending library name.
        name: String,
    },

    /// A path resolves outside of its allowed root.
    #[error("{package} contains a malicious file path: {path}")]
    BadFilePath {
        /// Library the path belongs to.
        package: String,
        /// The rejected path.
        path: String,
    },

    /// The file map is missing, mistyped or fails syntactic validation.
    #[error("{package} has an invalid npmFileMap: {reason}")]
    InvalidFileMap {
        /// Library the file map belongs to.
        package: String,
        /// Why the map was rejected.
        reason: String,
    },

    /// Library metadata is not usable (not an object, missing fields).
    #[error("invalid package metadata {}: {reason}", path.display())]
    InvalidPackage {
        /// Metadata file or library directory.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Path cannot serve as an allowed root.
    #[error("invalid allowed root: {path}")]
    InvalidRoot {
        /// The rejected root.
        path: PathBuf,
    },

    /// Version string is not valid semver.
    #[error("invalid version {version}: {reason}")]
    InvalidVersion {
        /// The version string.
        version: String,
        /// Parser message.
        reason: String,
    },

    /// The downloaded tarball produced no top-level directory.
    #[error("{package}@{version} never got extracted, no directory found in {}", path.display())]
    NotExtracted {
        /// Library npm name.
        package: String,
        /// Version being imported.
        version: String,
        /// Directory that was searched.
        path: PathBuf,
    },
}

impl UpdateError {
    /// Returns the path-safety violation kind, if this error is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdnsync_core::UpdateError;
    /// use cdnsync_core::error::PathViolation;
    ///
    /// let err = UpdateError::BadPackageName {
    ///     name: "../../evil".into(),
    /// };
    /// assert_eq!(err.violation(), Some(PathViolation::BadPackageName));
    /// ```
    #[must_use]
    pub const fn violation(&self) -> Option<PathViolation> {
        match self {
            Self::BadFilePath { .. } => Some(PathViolation::BadFilePath),
            Self::BadPackageName { .. } => Some(PathViolation::BadPackageName),
            _ => None,
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// Security violations include traversal in names or paths and
    /// file maps rejected by validation.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::BadFilePath { .. } | Self::BadPackageName { .. } | Self::InvalidFileMap { .. }
        )
    }

    /// Returns `true` if the surrounding batch can continue past this error.
    ///
    /// Only the library or entry that produced it is skipped. I/O errors on
    /// the shared temp or library directories are not recoverable.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdnsync_core::UpdateError;
    ///
    /// let err = UpdateError::BadFilePath {
    ///     package: "jquery".into(),
    ///     path: "/tmp/x/../etc".into(),
    /// };
    /// assert!(err.is_recoverable());
    /// ```
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }

    /// Converts a violation into its report record.
    ///
    /// Returns `None` for errors that are not path-safety violations.
    #[must_use]
    pub fn to_record(&self) -> Option<ViolationRecord> {
        self.violation().map(|kind| ViolationRecord {
            kind,
            message: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_file_path_display() {
        let err = UpdateError::BadFilePath {
            package: "jquery".into(),
            path: "/tmp/x/etc".into(),
        };
        assert_eq!(
            err.to_string(),
            "jquery contains a malicious file path: /tmp/x/etc"
        );
    }

    #[test]
    fn test_bad_package_name_display() {
        let err = UpdateError::BadPackageName {
            name: "../../evil".into(),
        };
        assert!(err.to_string().contains("malicious package name"));
        assert!(err.to_string().contains("../../evil"));
    }

    #[test]
    fn test_violation_kinds() {
        let err = UpdateError::BadFilePath {
            package: "a".into(),
            path: "b".into(),
        };
        assert_eq!(err.violation(), Some(PathViolation::BadFilePath));

        let err = UpdateError::InvalidFileMap {
            package: "a".into(),
            reason: "b".into(),
        };
        assert_eq!(err.violation(), None);
        assert!(err.is_security_violation());

        let err: UpdateError = std::io::Error::other("disk").into();
        assert_eq!(err.violation(), None);
        assert!(!err.is_security_violation());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_to_record() {
        let err = UpdateError::BadPackageName { name: "..".into() };
        let record = err.to_record().expect("name errors produce a record");
        assert_eq!(record.kind, PathViolation::BadPackageName);
        assert_eq!(record.message, err.to_string());

        let err = UpdateError::InvalidVersion {
            version: "x".into(),
            reason: "y".into(),
        };
        assert!(err.to_record().is_none());
    }

    #[test]
    fn test_record_serializes_kind_tag() {
        let record = ViolationRecord {
            kind: PathViolation::BadFilePath,
            message: "m".into(),
        };
        let json = serde_json::to_value(&record).expect("record serializes");
        assert_eq!(json["kind"], "BadFilePath");
        assert_eq!(json["message"], "m");
    }

    #[test]
    fn test_not_extracted_display() {
        let err = UpdateError::NotExtracted {
            package: "lodash".into(),
            version: "4.0.0".into(),
            path: PathBuf::from("/tmp/lodash/4.0.0"),
        };
        let display = err.to_string();
        assert!(display.contains("lodash@4.0.0"));
        assert!(display.contains("/tmp/lodash/4.0.0"));
    }
}
