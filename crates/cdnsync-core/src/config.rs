//! Configuration for library update runs.

use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::UpdateError;
use crate::security::is_contained;
use crate::security::normalize;
use crate::types::AllowedRoot;
use crate::types::invalid_library_name;

/// Shared-memory location used for scratch extraction when available.
const SHM_DIR: &str = "/run/shm";

/// Configuration for importing npm releases into the library tree.
///
/// # Examples
///
/// ```
/// use cdnsync_core::UpdateConfig;
///
/// let config = UpdateConfig {
///     libs_dir: "/srv/cdn/ajax/libs".into(),
///     max_parallel_libraries: 8,
///     ..Default::default()
/// };
/// assert!(config.canonicalize);
/// ```
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Directory holding `<name>/package.json` and `<name>/<version>/`.
    pub libs_dir: PathBuf,

    /// Scratch directory for downloaded and extracted tarballs.
    pub temp_dir: PathBuf,

    /// Mode applied recursively to the extracted tree before reading it.
    pub dir_mode: u32,

    /// Mode applied to every copied file.
    pub file_mode: u32,

    /// Re-check each source file after resolving symlinks on disk.
    pub canonicalize: bool,

    /// Source paths containing any of these (case-insensitive) are not
    /// copied. Archives ending in `.zip` are always skipped.
    pub skip_patterns: Vec<String>,

    /// Maximum number of libraries updated at the same time.
    pub max_parallel_libraries: usize,

    /// Use the `npmFileMap` shipped inside the package when it validates.
    pub prefer_packaged_file_map: bool,
}

impl Default for UpdateConfig {
    /// Default values:
    /// - `libs_dir`: `ajax/libs`
    /// - `temp_dir`: `/run/shm/cdnjs_NPM_temp` if `/run/shm` exists,
    ///   otherwise `temp`
    /// - `dir_mode`: 0o755, `file_mode`: 0o644
    /// - `canonicalize`: true
    /// - `skip_patterns`: `["dependencies"]`
    /// - `max_parallel_libraries`: 4
    /// - `prefer_packaged_file_map`: true
    fn default() -> Self {
        Self {
            libs_dir: PathBuf::from("ajax").join("libs"),
            temp_dir: default_temp_dir(),
            dir_mode: 0o755,
            file_mode: 0o644,
            canonicalize: true,
            skip_patterns: vec!["dependencies".to_string()],
            max_parallel_libraries: 4,
            prefer_packaged_file_map: true,
        }
    }
}

impl UpdateConfig {
    /// Returns `true` if a source file must not be copied.
    #[must_use]
    pub fn is_skipped(&self, source: &Path) -> bool {
        let lowered = source.to_string_lossy().to_lowercase();
        lowered.trim_end().ends_with(".zip")
            || self
                .skip_patterns
                .iter()
                .any(|pattern| lowered.contains(&pattern.to_lowercase()))
    }

    /// Catalog directory for one library.
    #[must_use]
    pub fn library_dir(&self, name: &str) -> PathBuf {
        self.libs_dir.join(name)
    }

    /// Catalog directory for one library version.
    #[must_use]
    pub fn version_dir(&self, name: &str, version: &str) -> PathBuf {
        self.libs_dir.join(name).join(version)
    }

    /// Scratch directory for one library version.
    #[must_use]
    pub fn temp_version_dir(&self, name: &str, version: &str) -> PathBuf {
        self.temp_dir.join(name).join(version)
    }

    /// Absolute catalog directory for one library version, guaranteed to lie
    /// strictly inside `libs_dir/<name>`, itself strictly inside `libs_dir`.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::BadPackageName` for an unusable library name and
    /// `UpdateError::BadFilePath` if the directory would resolve outside
    /// `libs_dir/<name>`.
    pub fn checked_version_dir(&self, name: &str, version: &str) -> Result<PathBuf> {
        contained_version_dir(&self.libs_dir, name, version)
    }

    /// Absolute scratch directory for one library version, with the same
    /// guarantee relative to `temp_dir`.
    ///
    /// # Errors
    ///
    /// Same as [`checked_version_dir`](Self::checked_version_dir).
    pub fn checked_temp_version_dir(&self, name: &str, version: &str) -> Result<PathBuf> {
        contained_version_dir(&self.temp_dir, name, version)
    }
}

fn contained_version_dir(base: &Path, name: &str, version: &str) -> Result<PathBuf> {
    if invalid_library_name(name) {
        return Err(UpdateError::BadPackageName {
            name: name.to_string(),
        });
    }
    let escaped = || UpdateError::BadFilePath {
        package: name.to_string(),
        path: format!("{name}/{version}"),
    };
    let strictly_inside = |outer: &AllowedRoot, inner: &str| {
        is_contained(outer, [inner]) && normalize(inner) != outer.as_str()
    };

    let root = AllowedRoot::new(std::path::absolute(base)?)?;
    let library = AllowedRoot::new(root.as_path().join(name)).map_err(|_| escaped())?;
    let dir = library.as_path().join(version);
    let dir = dir.to_str().ok_or_else(escaped)?;
    if !strictly_inside(&root, library.as_str()) || !strictly_inside(&library, dir) {
        return Err(escaped());
    }
    Ok(PathBuf::from(normalize(dir)))
}

fn default_temp_dir() -> PathBuf {
    if Path::new(SHM_DIR).is_dir() {
        Path::new(SHM_DIR).join("cdnjs_NPM_temp")
    } else {
        PathBuf::from("temp")
    }
}
