//! Import of an unpacked package version into the catalog.
//!
//! The whole file map is validated before anything is written. Each entry's
//! resolved base directory is then checked against the extraction root, and
//! each matched file is re-checked right before it is copied, both at its
//! source and at its destination.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use glob::MatchOptions;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::UpdateConfig;
use crate::UpdateError;
use crate::error::PathViolation;
use crate::extraction::tarball::find_extracted_root;
use crate::extraction::tarball::normalize_permissions;
use crate::report::ImportReport;
use crate::security::AllowedPathCheck;
use crate::security::escapes_on_disk;
use crate::security::is_contained;
use crate::types::AllowedRoot;
use crate::types::FileMap;
use crate::types::LibraryPackage;
use crate::types::invalid_library_name;
use crate::version::should_bump_version;

/// Boundaries for one import: where files may be read and written.
struct ImportScope {
    source: AllowedPathCheck,
    canonical_source: Option<PathBuf>,
    dest: AllowedPathCheck,
}

/// Imports an unpacked version into `libs_dir/<name>/<version>`.
///
/// `extract_dir` is the scratch directory the tarball was unpacked into; the
/// package itself is its first top-level directory.
///
/// Path violations do not fail the import. They are logged, recorded in the
/// returned report, and only the affected entry or file is skipped. If any
/// file was copied and the version is newer than the recorded one, the
/// library's `package.json` is updated.
///
/// # Errors
///
/// Returns an error if the library name is unsafe, no package directory was
/// extracted, the file map is invalid, or an I/O operation fails.
pub fn import_version(
    pkg: &mut LibraryPackage,
    version: &str,
    extract_dir: &Path,
    config: &UpdateConfig,
) -> Result<ImportReport> {
    let name = pkg.require_name()?.to_string();
    let label = pkg.display_name().to_string();
    if invalid_library_name(&name) {
        return Err(UpdateError::BadPackageName { name });
    }
    let lib_path = config.checked_version_dir(&name, version)?;

    let Some(extract_root) = find_extracted_root(extract_dir)? else {
        return Err(UpdateError::NotExtracted {
            package: label,
            version: version.to_string(),
            path: extract_dir.to_path_buf(),
        });
    };
    normalize_permissions(&extract_root, config.dir_mode)?;

    let file_map = select_file_map(pkg, &extract_root, config)?;

    let root = AllowedRoot::new(std::path::absolute(&extract_root)?)?;
    let scope = ImportScope {
        canonical_source: if config.canonicalize {
            Some(extract_root.canonicalize()?)
        } else {
            None
        },
        source: AllowedPathCheck::new(root),
        dest: AllowedPathCheck::new(AllowedRoot::new(&lib_path)?),
    };

    let mut report = ImportReport::new();
    for entry in &file_map {
        let contents = scope.source.root().join(&entry.base_path);
        if !scope.source.is_allowed([contents.as_str()]) {
            let message = format!("{label} contains a malicious file path: {contents}");
            warn!("{message}");
            report.add_violation(PathViolation::BadFilePath, message);
            continue;
        }
        let contents_root = AllowedRoot::new(&contents)?;

        for pattern in &entry.files {
            let matches = expand_pattern(&contents_root, pattern)?;
            if matches.is_empty() {
                warn!(
                    "{label}@{version} - couldn't find file in npmFileMap. Doesn't exist: {}/{pattern}",
                    contents_root
                );
                fs::create_dir_all(&lib_path)?;
                report.missing_patterns.push(pattern.clone());
                continue;
            }

            for source in matches {
                if config.is_skipped(&source) {
                    debug!("skipping {}", source.display());
                    report.files_skipped += 1;
                    continue;
                }
                copy_file(&scope, &contents_root, &source, config, &label, &mut report)?;
            }
        }
    }

    if report.updated {
        info!("imported {label}@{version} into {}", lib_path.display());
        match should_bump_version(pkg.version(), version) {
            Ok(true) => {
                pkg.set_version(version);
                pkg.save()?;
                report.version_bumped = true;
            }
            Ok(false) => {}
            Err(e) => warn!("{label}: not updating recorded version: {e}"),
        }
    }

    Ok(report)
}

/// Picks the file map for this import.
///
/// A map shipped inside the package replaces the catalog's one when it
/// passes validation; otherwise the catalog's map is used. Either way the
/// map returned has been validated.
fn select_file_map(
    pkg: &LibraryPackage,
    extract_root: &Path,
    config: &UpdateConfig,
) -> Result<FileMap> {
    if config.prefer_packaged_file_map {
        let packaged = extract_root.join("package.json");
        if packaged.is_file() {
            match LibraryPackage::load(&packaged).and_then(|p| p.file_map()) {
                Ok(file_map) => {
                    debug!("using npmFileMap shipped in {}", packaged.display());
                    return Ok(file_map);
                }
                Err(e) => debug!("ignoring packaged npmFileMap: {e}"),
            }
        }
    }
    pkg.file_map()
}

/// Expands a pattern below `contents_root`, returning regular files only.
///
/// Dotfiles and dot-directories only match when the pattern names the dot
/// explicitly.
fn expand_pattern(contents_root: &AllowedRoot, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(contents_root.as_str());
    let full = if escaped.ends_with('/') {
        format!("{escaped}{pattern}")
    } else {
        format!("{escaped}/{pattern}")
    };

    let mut files = Vec::new();
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    for entry in glob::glob_with(&full, options)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => debug!("unreadable path while matching {pattern}: {e}"),
        }
    }
    Ok(files)
}

/// Re-validates one matched file and copies it into the version directory.
fn copy_file(
    scope: &ImportScope,
    contents_root: &AllowedRoot,
    source: &Path,
    config: &UpdateConfig,
    label: &str,
    report: &mut ImportReport,
) -> Result<()> {
    let mut reject = |path: String| {
        let message = format!("{label} contains a malicious file path: {path}");
        warn!("{message}");
        report.files_skipped += 1;
        report.add_violation(PathViolation::BadFilePath, message);
    };

    let Some(source_str) = source.to_str() else {
        reject(source.display().to_string());
        return Ok(());
    };
    if !scope.source.is_allowed([source_str]) || !is_contained(contents_root, [source_str]) {
        reject(source_str.to_string());
        return Ok(());
    }
    if let Some(canonical_root) = &scope.canonical_source {
        if escapes_on_disk(canonical_root, source)? {
            reject(source_str.to_string());
            return Ok(());
        }
    }

    let Some(relative) = source
        .strip_prefix(contents_root.as_path())
        .ok()
        .and_then(Path::to_str)
    else {
        reject(source_str.to_string());
        return Ok(());
    };
    let dest = scope.dest.root().join(relative);
    if !scope.dest.is_allowed([dest.as_str()]) {
        reject(dest);
        return Ok(());
    }

    let dest = PathBuf::from(dest);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, &dest)?;
    set_file_mode(&dest, config.file_mode)?;
    debug!("copied {} -> {}", source.display(), dest.display());

    report.files_copied += 1;
    report.updated = true;
    Ok(())
}

#[cfg(unix)]
fn set_file_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_file_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
