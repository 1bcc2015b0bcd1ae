//! Where package tarballs come from.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::UpdateError;
use crate::types::invalid_library_name;
use crate::types::invalid_npm_name;

/// Result of asking a source for one version's tarball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The tarball was written to the requested file.
    Downloaded,
    /// The source has no tarball for this version.
    NotFound,
}

/// A provider of package versions and their tarballs.
///
/// Implementations are shared between the threads of a batch run.
pub trait TarballSource: Sync {
    /// Lists the versions published for `npm_name`.
    fn versions(&self, npm_name: &str) -> Result<Vec<String>>;

    /// Writes the tarball of `npm_name@version` to `dest_file`.
    fn fetch(&self, npm_name: &str, version: &str, dest_file: &Path) -> Result<FetchOutcome>;
}

/// Returns `true` if a version string is safe to use as a directory name.
#[must_use]
pub fn is_safe_version(version: &str) -> bool {
    !version.is_empty()
        && !invalid_npm_name(version)
        && !version.contains(['/', '\\', '\0'])
        && version != "."
}

/// A local directory laid out as `<root>/<npmName>/<version>.tgz`.
///
/// Scoped packages live one level deeper (`<root>/@scope/pkg/1.0.0.tgz`).
///
/// # Examples
///
/// ```no_run
/// use cdnsync_core::update::MirrorSource;
/// use cdnsync_core::update::TarballSource;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mirror = MirrorSource::new("/srv/npm-mirror");
/// for version in mirror.versions("jquery")? {
///     println!("{version}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MirrorSource {
    root: PathBuf,
}

impl MirrorSource {
    /// Creates a mirror source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn package_dir(&self, npm_name: &str) -> Result<PathBuf> {
        if invalid_library_name(npm_name) {
            return Err(UpdateError::BadPackageName {
                name: npm_name.to_string(),
            });
        }
        Ok(self.root.join(npm_name))
    }
}

impl TarballSource for MirrorSource {
    fn versions(&self, npm_name: &str) -> Result<Vec<String>> {
        let dir = self.package_dir(npm_name)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(version) = file_name.to_str().and_then(|n| n.strip_suffix(".tgz")) {
                versions.push(version.to_string());
            }
        }
        versions.sort_by(|a, b| match (semver::Version::parse(a), semver::Version::parse(b)) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            _ => a.cmp(b),
        });
        Ok(versions)
    }

    fn fetch(&self, npm_name: &str, version: &str, dest_file: &Path) -> Result<FetchOutcome> {
        if !is_safe_version(version) {
            return Err(UpdateError::BadFilePath {
                package: npm_name.to_string(),
                path: version.to_string(),
            });
        }
        let source = self.package_dir(npm_name)?.join(format!("{version}.tgz"));
        if !source.is_file() {
            return Ok(FetchOutcome::NotFound);
        }
        fs::copy(&source, dest_file)?;
        Ok(FetchOutcome::Downloaded)
    }
}
