//! Error conversion utilities for CLI.
//!
//! Converts cdnsync-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use cdnsync_core::UpdateError;

/// Converts `UpdateError` to user-friendly anyhow error with context
pub fn convert_update_error(err: UpdateError, library: &str) -> anyhow::Error {
    match err {
        UpdateError::BadPackageName { name } => {
            anyhow!(
                "Security violation: library name '{name}' would leave the catalog directory\n\
                 HINT: Library names must not contain '..' or start with '/'. Fix the catalog entry before updating."
            )
        }
        UpdateError::BadFilePath { package, path } => {
            anyhow!(
                "Security violation: '{package}' resolves a path outside its root: {path}\n\
                 HINT: Check basePath and files in the library's npmFileMap."
            )
        }
        UpdateError::InvalidFileMap { package, reason } => {
            anyhow!(
                "Invalid npmFileMap for '{package}': {reason}\n\
                 HINT: Run `cdnsync check <PACKAGE_JSON>` for details."
            )
        }
        UpdateError::InvalidPackage { path, reason } => {
            anyhow!(
                "Invalid library metadata '{}': {reason}\n\
                 HINT: package.json must be an object with at least \"name\", \"npmName\" and \"npmFileMap\".",
                path.display()
            )
        }
        UpdateError::InvalidRoot { path } => {
            anyhow!(
                "Invalid root '{}'\n\
                 HINT: Roots must be absolute UTF-8 paths.",
                path.display()
            )
        }
        UpdateError::NotExtracted {
            package,
            version,
            path,
        } => {
            anyhow!(
                "{package}@{version} did not unpack into a directory under '{}'\n\
                 HINT: The tarball may be empty or corrupted.",
                path.display()
            )
        }
        UpdateError::InvalidVersion { version, reason } => {
            anyhow!(
                "Invalid version '{version}' for '{library}': {reason}\n\
                 HINT: Versions must be valid semver, e.g. 1.2.3 or 2.0.0-beta.1."
            )
        }
        UpdateError::Io(io_err) => {
            anyhow!("I/O error while processing '{library}': {io_err}")
        }
        _ => anyhow::Error::from(err).context(format!("Error processing library '{library}'")),
    }
}

/// Adds library context to a core result
pub fn add_library_context<T>(
    result: Result<T, UpdateError>,
    library: &str,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_update_error(e, library))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_bad_package_name() {
        let err = UpdateError::BadPackageName {
            name: "../../evil".into(),
        };
        let msg = format!("{:?}", convert_update_error(err, "evil"));
        assert!(msg.contains("Security violation"));
        assert!(msg.contains("../../evil"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_bad_file_path() {
        let err = UpdateError::BadFilePath {
            package: "jquery".into(),
            path: "/tmp/x/etc/passwd".into(),
        };
        let msg = format!("{:?}", convert_update_error(err, "jquery"));
        assert!(msg.contains("jquery"));
        assert!(msg.contains("/tmp/x/etc/passwd"));
        assert!(msg.contains("npmFileMap"));
    }

    #[test]
    fn test_convert_not_extracted() {
        let err = UpdateError::NotExtracted {
            package: "lodash".into(),
            version: "4.0.0".into(),
            path: PathBuf::from("/scratch/lodash/4.0.0"),
        };
        let msg = format!("{:?}", convert_update_error(err, "lodash"));
        assert!(msg.contains("lodash@4.0.0"));
        assert!(msg.contains("corrupted"));
    }

    #[test]
    fn test_convert_io_error() {
        let err = UpdateError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        let msg = format!("{:?}", convert_update_error(err, "a"));
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_other_errors_keep_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let msg = format!("{:?}", convert_update_error(json_err.into(), "a"));
        assert!(msg.contains("Error processing library 'a'"));
        assert!(msg.contains("JSON error"));
    }
}
