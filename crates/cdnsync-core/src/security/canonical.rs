//! Filesystem-aware containment check.
//!
//! The lexical check in [`path`](super::path) cannot see symlinks. Once a
//! package is on disk, a source file is re-checked after resolving it with
//! `canonicalize()` so that a link pointing out of the extracted tree is
//! caught before it is read.

use std::path::Path;

use crate::Result;

/// Returns `true` if `candidate` is a symlink or resolves, through any
/// symlinked ancestor, to a location outside `canonical_root`.
///
/// `canonical_root` must already be canonical. Comparison uses
/// [`Path::starts_with`], which matches whole components.
///
/// # Errors
///
/// Returns an I/O error if `candidate` cannot be inspected or resolved.
pub fn escapes_on_disk(canonical_root: &Path, candidate: &Path) -> Result<bool> {
    if std::fs::symlink_metadata(candidate)?.file_type().is_symlink() {
        return Ok(true);
    }
    let resolved = candidate.canonicalize()?;
    Ok(!resolved.starts_with(canonical_root))
}
