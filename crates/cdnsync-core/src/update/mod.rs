//! Batch update of catalog libraries from a tarball source.
//!
//! A run discovers npm-enabled libraries, asks the source for their
//! published versions and imports every version the catalog does not have
//! yet. Libraries are processed in parallel; versions of one library are
//! processed in order so that the recorded latest version is bumped
//! deterministically.

mod discover;
mod source;

pub use discover::discover_libraries;
pub use source::FetchOutcome;
pub use source::MirrorSource;
pub use source::TarballSource;
pub use source::is_safe_version;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::UpdateConfig;
use crate::UpdateError;
use crate::extraction::import_version;
use crate::extraction::unpack_tarball;
use crate::report::BatchReport;
use crate::report::LibraryReport;
use crate::report::UpdateProgress;
use crate::report::VersionOutcome;
use crate::types::LibraryPackage;
use crate::types::invalid_library_name;

/// Downloads and imports one version of a library.
///
/// Versions whose directory already exists in the catalog are left alone.
/// When the source has no tarball for the version an empty directory is
/// created so the version is not requested again.
///
/// # Errors
///
/// Returns `UpdateError::BadPackageName` if the library or npm name contains
/// traversal or is absolute, `UpdateError::BadFilePath` if the version is not
/// a safe directory name or either directory would leave its base, and any
/// error from fetching, unpacking or importing.
pub fn update_library_version(
    pkg: &mut LibraryPackage,
    version: &str,
    source: &dyn TarballSource,
    config: &UpdateConfig,
) -> Result<VersionOutcome> {
    let name = pkg.require_name()?.to_string();
    let npm_name = pkg
        .npm_name()
        .ok_or_else(|| UpdateError::InvalidPackage {
            path: pkg.path().to_path_buf(),
            reason: "missing \"npmName\"".to_string(),
        })?
        .to_string();
    for checked in [&name, &npm_name] {
        if invalid_library_name(checked) {
            return Err(UpdateError::BadPackageName {
                name: checked.clone(),
            });
        }
    }
    if !is_safe_version(version) {
        return Err(UpdateError::BadFilePath {
            package: npm_name,
            path: version.to_string(),
        });
    }

    let lib_path = config.checked_version_dir(&name, version)?;
    let extract_dir = config.checked_temp_version_dir(&name, version)?;
    if lib_path.exists() {
        debug!("{npm_name}@{version} already present");
        return Ok(VersionOutcome::AlreadyPresent);
    }

    fs::create_dir_all(&extract_dir)?;
    let tarball = extract_dir.join("dist.tar.gz");

    let result = match source.fetch(&npm_name, version, &tarball) {
        Ok(FetchOutcome::NotFound) => {
            warn!("{npm_name}@{version} - tarball not found, creating empty directory");
            fs::create_dir_all(&lib_path)
                .map(|()| VersionOutcome::NotFound)
                .map_err(UpdateError::from)
        }
        Ok(FetchOutcome::Downloaded) => {
            info!("downloaded {npm_name}@{version}");
            unpack_tarball(&tarball, &extract_dir)
                .and_then(|()| fs::remove_file(&tarball).map_err(UpdateError::from))
                .and_then(|()| import_version(pkg, version, &extract_dir, config))
                .map(VersionOutcome::Imported)
        }
        Err(e) => Err(e),
    };

    if let Err(e) = fs::remove_dir_all(&extract_dir) {
        debug!("could not clean {}: {e}", extract_dir.display());
    }
    result
}

/// Imports every missing version of one library.
///
/// Never fails: a library whose file map or name is unsafe is skipped with
/// a logged violation, and per-version errors are recorded in the report.
/// An I/O error stops processing of the remaining versions.
pub fn update_library(
    pkg: &mut LibraryPackage,
    source: &dyn TarballSource,
    config: &UpdateConfig,
) -> LibraryReport {
    let label = pkg.display_name().to_string();
    let mut report = LibraryReport::new(pkg.name().unwrap_or(&label));

    if let Err(e) = pkg.file_map() {
        warn!("{label} has a malicious npmFileMap");
        report.skipped = Some(e.to_string());
        return report;
    }

    let names = [pkg.name(), pkg.npm_name()];
    if let Some(bad) = names.into_iter().flatten().find(|n| invalid_library_name(n)) {
        let err = UpdateError::BadPackageName {
            name: bad.to_string(),
        };
        warn!("{err}");
        report.violations.extend(err.to_record());
        report.skipped = Some(err.to_string());
        return report;
    }

    let Some(npm_name) = pkg.npm_name().map(str::to_string) else {
        report.skipped = Some("missing npmName".to_string());
        return report;
    };
    let versions = match source.versions(&npm_name) {
        Ok(versions) => versions,
        Err(e) => {
            warn!("{label}: could not list versions: {e}");
            report.violations.extend(e.to_record());
            report.skipped = Some(e.to_string());
            return report;
        }
    };

    for version in versions {
        match update_library_version(pkg, &version, source, config) {
            Ok(outcome) => report.versions.push((version, outcome)),
            Err(e) => {
                warn!("{label}@{version}: {e}");
                report.violations.extend(e.to_record());
                let stop = !e.is_recoverable();
                report.versions.push((version, VersionOutcome::Failed(e.to_string())));
                if stop {
                    report.skipped = Some(e.to_string());
                    break;
                }
            }
        }
    }
    report
}

/// Updates many libraries in parallel.
///
/// The scratch directory is cleared before and after the run. At most
/// `config.max_parallel_libraries` libraries are processed at once.
/// Reports are returned in the order the libraries were given.
///
/// # Errors
///
/// Returns an error only if the scratch directory cannot be prepared or the
/// worker pool cannot be started. Per-library failures are in the report.
///
/// # Examples
///
/// ```no_run
/// use cdnsync_core::UpdateConfig;
/// use cdnsync_core::report::NoopProgress;
/// use cdnsync_core::update::MirrorSource;
/// use cdnsync_core::update::discover_libraries;
/// use cdnsync_core::update::run_batch;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = UpdateConfig::default();
/// let libraries = discover_libraries(&config.libs_dir, "*")?;
/// let source = MirrorSource::new("/srv/npm-mirror");
/// let report = run_batch(libraries, &source, &config, &NoopProgress)?;
/// println!("{} new versions", report.new_versions);
/// # Ok(())
/// # }
/// ```
pub fn run_batch(
    libraries: Vec<LibraryPackage>,
    source: &dyn TarballSource,
    config: &UpdateConfig,
    progress: &dyn UpdateProgress,
) -> Result<BatchReport> {
    let start = Instant::now();
    reset_dir(&config.temp_dir)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_parallel_libraries.max(1))
        .build()
        .map_err(|e| UpdateError::Io(std::io::Error::other(e)))?;

    let libraries: Vec<LibraryReport> = pool.install(|| {
        libraries
            .into_par_iter()
            .map(|mut pkg| {
                progress.on_library_start(pkg.display_name());
                let report = update_library(&mut pkg, source, config);
                progress.on_library_complete(&report);
                report
            })
            .collect()
    });

    if let Err(e) = fs::remove_dir_all(&config.temp_dir) {
        debug!("could not clean {}: {e}", config.temp_dir.display());
    }

    let report = BatchReport::from_libraries(libraries, start.elapsed());
    info!(
        "Auto Update Completed - {} versions were updated",
        report.new_versions
    );
    progress.on_complete(&report);
    Ok(report)
}

fn reset_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
