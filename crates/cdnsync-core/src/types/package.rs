//! Per-library metadata (`package.json`) and package name checks.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;

use super::FileMap;
use crate::Result;
use crate::UpdateError;
use crate::security::first_invalid_path;

/// Returns `true` if a library name contains a parent directory traversal.
///
/// # Examples
///
/// ```
/// use cdnsync_core::types::invalid_npm_name;
///
/// assert!(invalid_npm_name("../../evil"));
/// assert!(!invalid_npm_name("jquery"));
/// assert!(!invalid_npm_name("@scope/pkg"));
/// ```
#[must_use]
pub fn invalid_npm_name(name: &str) -> bool {
    name.contains("..")
}

/// Returns `true` if a name cannot be used as a directory below the catalog.
///
/// On top of [`invalid_npm_name`], rejects empty names, absolute names and
/// names containing a backslash or NUL byte. Scoped names stay valid.
///
/// # Examples
///
/// ```
/// use cdnsync_core::types::invalid_library_name;
///
/// assert!(invalid_library_name("/tmp/victim"));
/// assert!(invalid_library_name("..\\evil"));
/// assert!(invalid_library_name(""));
/// assert!(!invalid_library_name("@scope/pkg"));
/// ```
#[must_use]
pub fn invalid_library_name(name: &str) -> bool {
    invalid_npm_name(name)
        || name.is_empty()
        || name.starts_with('/')
        || name.contains(['\\', '\0'])
}

/// Returns the name used to look a package up in the registry.
///
/// Scoped names (`@scope/pkg`) have their separator escaped as `%2f`.
///
/// # Examples
///
/// ```
/// use cdnsync_core::types::registry_name;
///
/// assert_eq!(registry_name("@angular/core"), "@angular%2fcore");
/// assert_eq!(registry_name("lodash"), "lodash");
/// ```
#[must_use]
pub fn registry_name(npm_name: &str) -> String {
    match npm_name.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        Some((scope, name)) if !scope.is_empty() && !name.is_empty() => {
            format!("@{scope}%2f{name}")
        }
        _ => npm_name.to_string(),
    }
}

/// A library's `package.json` in the catalog.
///
/// The document is kept as an ordered JSON object so that rewriting it (for
/// a version bump) preserves field order and fields this crate does not
/// know about.
#[derive(Debug, Clone)]
pub struct LibraryPackage {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl LibraryPackage {
    /// Parses metadata from a JSON string.
    ///
    /// `path` is where the document lives (or will be written).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or not an object.
    pub fn from_json_str(path: impl Into<PathBuf>, json: &str) -> Result<Self> {
        let path = path.into();
        match serde_json::from_str::<Value>(json)? {
            Value::Object(doc) => Ok(Self { path, doc }),
            _ => Err(UpdateError::InvalidPackage {
                path,
                reason: "top-level value is not an object".to_string(),
            }),
        }
    }

    /// Reads metadata from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        Self::from_json_str(path, &json)
    }

    /// Writes the metadata back as 2-space indented JSON with a trailing
    /// newline.
    pub fn save(&self) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&self.doc)?;
        json.push('\n');
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Location of the metadata file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.doc.get(key).and_then(Value::as_str)
    }

    /// Catalog name of the library (its directory under the libs dir).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Name of the package on npm.
    #[must_use]
    pub fn npm_name(&self) -> Option<&str> {
        self.str_field("npmName")
    }

    /// Latest version recorded in the catalog.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    /// Records a new latest version.
    pub fn set_version(&mut self, version: &str) {
        self.doc
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    /// Raw, unvalidated `npmFileMap` value.
    #[must_use]
    pub fn raw_file_map(&self) -> Option<&Value> {
        self.doc.get("npmFileMap")
    }

    /// Replaces the `npmFileMap`.
    pub fn set_file_map(&mut self, file_map: &FileMap) -> Result<()> {
        self.doc
            .insert("npmFileMap".to_string(), serde_json::to_value(file_map)?);
        Ok(())
    }

    /// Returns `true` if both `npmName` and `npmFileMap` are present.
    #[must_use]
    pub fn is_npm_enabled(&self) -> bool {
        self.npm_name().is_some() && self.raw_file_map().is_some()
    }

    /// Name used in log and error messages.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.npm_name().or_else(|| self.name()).unwrap_or("<unnamed>")
    }

    /// Returns the catalog name, or an error if it is missing.
    pub fn require_name(&self) -> Result<&str> {
        self.name().ok_or_else(|| UpdateError::InvalidPackage {
            path: self.path.clone(),
            reason: "missing \"name\"".to_string(),
        })
    }

    /// Parses and syntactically validates the `npmFileMap`.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::InvalidFileMap` if the map is absent, mistyped,
    /// or contains a path that fails
    /// [`is_valid_path`](crate::security::is_valid_path).
    pub fn file_map(&self) -> Result<FileMap> {
        let invalid = |reason: String| UpdateError::InvalidFileMap {
            package: self.display_name().to_string(),
            reason,
        };

        let raw = self
            .raw_file_map()
            .ok_or_else(|| invalid("missing npmFileMap".to_string()))?;
        let file_map = FileMap::from_value(raw).map_err(|e| invalid(e.to_string()))?;
        if let Some(path) = first_invalid_path(&file_map) {
            return Err(invalid(format!("path {path:?} is not a plain relative path")));
        }
        Ok(file_map)
    }
}
