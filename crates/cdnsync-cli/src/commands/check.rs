//! Check command implementation

use crate::cli::CheckArgs;
use crate::output::OutputFormatter;
use crate::output::PackageCheck;
use anyhow::Result;
use anyhow::bail;
use cdnsync_core::UpdateError;
use cdnsync_core::invalid_library_name;
use cdnsync_core::security::first_invalid_path;
use cdnsync_core::security::lint_package;
use cdnsync_core::types::FileMap;
use cdnsync_core::types::LibraryPackage;
use std::path::Path;

pub fn execute(args: &CheckArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let results: Vec<PackageCheck> = args.packages.iter().map(|p| check_package(p)).collect();

    formatter.format_check_results(&results)?;

    let rejected = results.iter().filter(|r| !r.valid).count();
    if rejected > 0 {
        bail!("{rejected} of {} package(s) rejected", results.len());
    }
    Ok(())
}

fn check_package(path: &Path) -> PackageCheck {
    let mut check = PackageCheck {
        path: path.display().to_string(),
        library: String::new(),
        valid: true,
        errors: Vec::new(),
        violations: Vec::new(),
        lints: Vec::new(),
    };

    let pkg = match LibraryPackage::load(path) {
        Ok(pkg) => pkg,
        Err(e) => {
            check.valid = false;
            check.errors.push(e.to_string());
            return check;
        }
    };
    check.library = pkg.display_name().to_string();

    for name in [pkg.name(), pkg.npm_name()].into_iter().flatten() {
        if invalid_library_name(name) {
            let err = UpdateError::BadPackageName {
                name: name.to_string(),
            };
            check.violations.extend(err.to_record());
            check.valid = false;
        }
    }

    if let Some(raw) = pkg.raw_file_map() {
        match FileMap::from_value(raw) {
            Ok(file_map) => {
                if let Some(bad) = first_invalid_path(&file_map) {
                    let err = UpdateError::BadFilePath {
                        package: check.library.clone(),
                        path: bad.to_string(),
                    };
                    check.violations.extend(err.to_record());
                    check.valid = false;
                }
            }
            Err(e) => {
                check.errors.push(format!("npmFileMap: {e}"));
                check.valid = false;
            }
        }
    }

    check.lints = lint_package(&pkg)
        .into_iter()
        .map(|issue| match issue.entry {
            Some(index) => format!("npmFileMap[{index}]: {}", issue.message),
            None => issue.message,
        })
        .collect();
    check
}
