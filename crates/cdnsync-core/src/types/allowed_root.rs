//! Sandbox boundary for one extraction operation.

use crate::Result;
use crate::UpdateError;
use crate::security::normalize;
use std::path::Path;

/// An absolute, lexically normalized directory that extracted files must stay
/// within.
///
/// # Security Properties
///
/// - Always absolute
/// - Contains no `.` or `..` segments and no repeated separators
/// - Has no trailing separator (except for `/` itself)
/// - Never touches the filesystem during construction
///
/// # Examples
///
/// ```
/// use cdnsync_core::types::AllowedRoot;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = AllowedRoot::new("/tmp//x/./pkg-1.0.0/")?;
/// assert_eq!(root.as_str(), "/tmp/x/pkg-1.0.0");
///
/// assert!(AllowedRoot::new("relative/dir").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllowedRoot(String);

impl AllowedRoot {
    /// Creates a root from an absolute path, normalizing it lexically.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::InvalidRoot` if the path is relative, is not
    /// valid UTF-8 or contains a null byte.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let invalid = || UpdateError::InvalidRoot {
            path: path.to_path_buf(),
        };

        let raw = path.to_str().ok_or_else(invalid)?;
        if !raw.starts_with('/') || raw.contains('\0') {
            return Err(invalid());
        }

        let mut normalized = normalize(raw);
        if normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }
        Ok(Self(normalized))
    }

    /// Returns the root as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the root as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Joins a relative path onto the root and normalizes the result.
    ///
    /// The result is not guaranteed to be contained; pass it through
    /// [`is_contained`](crate::security::is_contained) before use.
    #[must_use]
    pub fn join(&self, relative: &str) -> String {
        if self.0 == "/" {
            normalize(&format!("/{relative}"))
        } else {
            normalize(&format!("{}/{relative}", self.0))
        }
    }
}

impl std::fmt::Display for AllowedRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for AllowedRoot {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}
