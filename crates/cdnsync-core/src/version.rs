//! Rule for advancing a library's recorded latest version.

use semver::Version;

use crate::Result;
use crate::UpdateError;

fn parse(version: &str) -> Result<Version> {
    Version::parse(version.trim_start_matches('v')).map_err(|e| UpdateError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// Returns `true` if `version` carries no pre-release tag.
pub fn is_stable(version: &str) -> Result<bool> {
    Ok(parse(version)?.pre.is_empty())
}

/// Decides whether `candidate` should replace the recorded `current` version.
///
/// A candidate wins when nothing is recorded yet, or when it is newer and
/// either stable itself or both versions are pre-releases. A pre-release never
/// replaces a stable version.
///
/// # Errors
///
/// Returns `UpdateError::InvalidVersion` if either version is not semver.
///
/// # Examples
///
/// ```
/// use cdnsync_core::version::should_bump_version;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// assert!(should_bump_version(None, "1.0.0")?);
/// assert!(should_bump_version(Some("1.0.0"), "1.1.0")?);
/// assert!(!should_bump_version(Some("1.0.0"), "2.0.0-beta.1")?);
/// assert!(should_bump_version(Some("2.0.0-alpha"), "2.0.0-beta")?);
/// # Ok(())
/// # }
/// ```
pub fn should_bump_version(current: Option<&str>, candidate: &str) -> Result<bool> {
    let Some(current) = current else {
        return Ok(true);
    };
    let current = parse(current)?;
    let candidate = parse(candidate)?;

    if candidate <= current {
        return Ok(false);
    }
    Ok(candidate.pre.is_empty() || !current.pre.is_empty())
}
