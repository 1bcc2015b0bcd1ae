//! Discovery of npm-enabled libraries in the catalog.

use std::path::Path;

use tracing::debug;
use tracing::warn;

use crate::Result;
use crate::UpdateError;
use crate::security::is_valid_path;
use crate::types::LibraryPackage;

/// Loads every `<libs_dir>/<pattern>/package.json` that declares both
/// `npmName` and `npmFileMap`.
///
/// `pattern` is a glob over library directory names, such as `*` or
/// `jquery*`. Metadata files that cannot be parsed are logged and skipped.
/// Results are in path order.
///
/// # Errors
///
/// Returns an error if `pattern` contains traversal or is not a valid glob.
pub fn discover_libraries(libs_dir: &Path, pattern: &str) -> Result<Vec<LibraryPackage>> {
    if pattern.is_empty() || !is_valid_path(pattern) || pattern.contains('/') {
        return Err(UpdateError::BadFilePath {
            package: libs_dir.display().to_string(),
            path: pattern.to_string(),
        });
    }

    let base = glob::Pattern::escape(&libs_dir.to_string_lossy());
    let full = format!("{}/{pattern}/package.json", base.trim_end_matches('/'));

    let mut packages = Vec::new();
    for entry in glob::glob(&full)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("unreadable catalog entry: {e}");
                continue;
            }
        };
        match LibraryPackage::load(&path) {
            Ok(pkg) if pkg.is_npm_enabled() => packages.push(pkg),
            Ok(_) => debug!("{} has no npm auto-update config", path.display()),
            Err(e) => warn!("skipping {}: {e}", path.display()),
        }
    }
    Ok(packages)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::write_library;
    use std::fs;
    use tempfile::TempDir;

    const MAP: &str = r#"[{"basePath": "dist", "files": ["*.js"]}]"#;

    #[test]
    fn test_discovers_only_npm_enabled() {
        let temp = TempDir::new().unwrap();
        write_library(temp.path(), "b-lib", "b-lib", MAP);
        write_library(temp.path(), "a-lib", "a-lib", MAP);
        fs::create_dir(temp.path().join("manual")).unwrap();
        fs::write(
            temp.path().join("manual/package.json"),
            r#"{"name": "manual", "version": "1.0.0"}"#,
        )
        .unwrap();

        let found = discover_libraries(temp.path(), "*").unwrap();
        let names: Vec<_> = found.iter().filter_map(LibraryPackage::name).collect();
        assert_eq!(names, vec!["a-lib", "b-lib"]);
    }

    #[test]
    fn test_pattern_filters() {
        let temp = TempDir::new().unwrap();
        write_library(temp.path(), "jquery", "jquery", MAP);
        write_library(temp.path(), "lodash", "lodash", MAP);
        let found = discover_libraries(temp.path(), "jq*").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), Some("jquery"));
    }

    #[test]
    fn test_broken_metadata_skipped() {
        let temp = TempDir::new().unwrap();
        write_library(temp.path(), "good", "good", MAP);
        fs::create_dir(temp.path().join("broken")).unwrap();
        fs::write(temp.path().join("broken/package.json"), "{ nope").unwrap();
        assert_eq!(discover_libraries(temp.path(), "*").unwrap().len(), 1);
    }

    #[test]
    fn test_traversal_pattern_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(discover_libraries(temp.path(), "..").is_err());
        assert!(discover_libraries(temp.path(), "../*").is_err());
        assert!(discover_libraries(temp.path(), "/etc").is_err());
        assert!(discover_libraries(temp.path(), "").is_err());
    }
}
