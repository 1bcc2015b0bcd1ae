//! Test utilities for building npm-style tarballs and catalog layouts.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;

/// One entry of a test tarball.
#[derive(Debug, Clone, Copy)]
pub enum TestEntry<'a> {
    /// Regular file with mode 0o644.
    File(&'a str, &'a str),
    /// Symbolic link pointing at the given target.
    Symlink(&'a str, &'a str),
}

/// Writes a `.tgz` containing the given entries.
pub fn write_tgz_entries(path: &Path, entries: &[TestEntry<'_>]) {
    let file = File::create(path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for entry in entries {
        match *entry {
            TestEntry::File(name, content) => {
                let mut header = tar::Header::new_gnu();
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append_data(&mut header, name, content.as_bytes())
                    .unwrap();
            }
            TestEntry::Symlink(name, target) => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_size(0);
                header.set_mode(0o777);
                builder.append_link(&mut header, name, target).unwrap();
            }
        }
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Writes a `.tgz` containing regular files given as `(path, content)`.
///
/// # Examples
///
/// ```
/// use cdnsync_core::test_utils::write_tgz;
///
/// let temp = tempfile::TempDir::new().unwrap();
/// let archive = temp.path().join("pkg.tgz");
/// write_tgz(&archive, &[("package/dist/a.js", "a")]);
/// assert!(archive.exists());
/// ```
pub fn write_tgz(path: &Path, files: &[(&str, &str)]) {
    let entries: Vec<TestEntry<'_>> = files
        .iter()
        .map(|(name, content)| TestEntry::File(name, content))
        .collect();
    write_tgz_entries(path, &entries);
}

/// Writes `<libs_dir>/<name>/package.json` with the given file map.
pub fn write_library(libs_dir: &Path, name: &str, npm_name: &str, file_map: &str) -> PathBuf {
    let dir = libs_dir.join(name);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("package.json");
    fs::write(
        &path,
        format!(
            "{{\n  \"name\": \"{name}\",\n  \"npmName\": \"{npm_name}\",\n  \"npmFileMap\": {file_map}\n}}\n"
        ),
    )
    .unwrap();
    path
}

/// Places a tarball for `npm_name@version` into a mirror directory.
pub fn write_mirror_version(
    mirror: &Path,
    npm_name: &str,
    version: &str,
    files: &[(&str, &str)],
) {
    let dir = mirror.join(npm_name);
    fs::create_dir_all(&dir).unwrap();
    write_tgz(&dir.join(format!("{version}.tgz")), files);
}
