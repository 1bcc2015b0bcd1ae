//! Unpacking of downloaded `.tgz` packages into a scratch directory.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::GzDecoder;
use walkdir::WalkDir;

use crate::Result;

/// Unpacks a gzip-compressed tarball into `dest`.
///
/// Entries are unpacked with tar's in-destination semantics: `..` entries
/// are refused and absolute entry paths are re-rooted under `dest`.
/// Permissions from the archive are not preserved.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be read or unpacked.
pub fn unpack_tarball(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut tar = tar::Archive::new(decoder);
    tar.set_preserve_permissions(false);
    tar.set_preserve_mtime(false);
    tar.set_overwrite(true);
    tar.unpack(dest)?;
    Ok(())
}

/// Returns the first top-level directory of an unpacked package.
///
/// npm tarballs usually unpack into `package/`, but not always. Directories
/// are considered in name order.
pub fn find_extracted_root(dir: &Path) -> Result<Option<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs.into_iter().next())
}

/// Applies `mode` to every file and directory under `dir`.
///
/// Some packages ship unreadable files or directories. Symlinks are left
/// untouched.
#[cfg(unix)]
pub fn normalize_permissions(dir: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.path_is_symlink() {
            continue;
        }
        fs::set_permissions(entry.path(), fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

/// Applies `mode` to every file and directory under `dir`.
///
/// Permission bits are a Unix concept; elsewhere the tree is only walked to
/// surface unreadable entries.
#[cfg(not(unix))]
pub fn normalize_permissions(dir: &Path, _mode: u32) -> Result<()> {
    for entry in WalkDir::new(dir).follow_links(false) {
        entry.map_err(std::io::Error::from)?;
    }
    Ok(())
}
