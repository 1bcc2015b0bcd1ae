//! Import command implementation

use crate::cli::ImportArgs;
use crate::error::add_library_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use cdnsync_core::UpdateConfig;
use cdnsync_core::extraction::import_version;
use cdnsync_core::extraction::unpack_tarball;
use cdnsync_core::types::LibraryPackage;
use cdnsync_core::update::is_safe_version;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

pub fn execute(args: &ImportArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    if !args.tarball.is_file() {
        bail!("Tarball not found: {}", args.tarball.display());
    }
    if !is_safe_version(&args.release) {
        bail!(
            "Invalid version '{}'\n\
             HINT: Versions are used as directory names and must not contain '/' or '..'.",
            args.release
        );
    }

    let mut pkg = LibraryPackage::load(&args.package)
        .with_context(|| format!("Failed to read '{}'", args.package.display()))?;
    let library = pkg.display_name().to_string();

    let mut config = UpdateConfig {
        libs_dir: libs_dir(args)?,
        ..Default::default()
    };
    args.options.apply(&mut config);

    let name = add_library_context(pkg.require_name().map(str::to_string), &library)?;
    let extract_dir = add_library_context(
        config.checked_temp_version_dir(&name, &args.release),
        &library,
    )?;
    fs::create_dir_all(&extract_dir)
        .with_context(|| format!("Failed to create '{}'", extract_dir.display()))?;

    let result = unpack_tarball(&args.tarball, &extract_dir)
        .and_then(|()| import_version(&mut pkg, &args.release, &extract_dir, &config));
    if let Err(e) = fs::remove_dir_all(&extract_dir) {
        debug!("could not clean {}: {e}", extract_dir.display());
    }
    let report = add_library_context(result, &library)?;

    formatter.format_import_result(&library, &args.release, &report)?;
    Ok(())
}

/// The catalog directory: explicit, or the grandparent of the metadata file.
fn libs_dir(args: &ImportArgs) -> Result<PathBuf> {
    if let Some(dir) = &args.libs_dir {
        return Ok(dir.clone());
    }
    args.package
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            anyhow!(
                "Cannot infer the catalog directory from '{}'\n\
                 HINT: Pass --libs-dir.",
                args.package.display()
            )
        })
}
