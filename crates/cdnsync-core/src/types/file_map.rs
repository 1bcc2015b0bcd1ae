//! The `npmFileMap` model: which files to take from a downloaded package.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// One `{basePath, files}` entry of a file map.
///
/// An absent `basePath` means the extraction root. An explicit `null` or a
/// non-string value fails to deserialize, which rejects the whole map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapEntry {
    /// Directory prefix, relative to the extraction root.
    #[serde(rename = "basePath", default)]
    pub base_path: String,

    /// Glob patterns, relative to `base_path`.
    pub files: Vec<String>,
}

impl FileMapEntry {
    /// Creates an entry from a base path and patterns.
    pub fn new<I, S>(base_path: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_path: base_path.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered list of [`FileMapEntry`] attached to a library's metadata.
///
/// A `FileMap` is only a parsed shape. It says nothing about safety until it
/// has passed [`is_valid_file_map`](crate::security::is_valid_file_map), and
/// it is re-validated on every use.
///
/// # Examples
///
/// ```
/// use cdnsync_core::types::FileMap;
/// use serde_json::json;
///
/// let map = FileMap::from_value(&json!([{ "basePath": "dist", "files": ["**/*"] }]))
///     .expect("well-typed map");
/// assert_eq!(map.len(), 1);
///
/// assert!(FileMap::from_value(&json!([{ "basePath": null, "files": [] }])).is_err());
/// assert!(FileMap::from_value(&json!([{ "basePath": "dist", "files": [null] }])).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMap(Vec<FileMapEntry>);

impl FileMap {
    /// Creates a file map from entries.
    #[must_use]
    pub fn new(entries: Vec<FileMapEntry>) -> Self {
        Self(entries)
    }

    /// Parses an untrusted JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an array of well-typed entries.
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[FileMapEntry] {
        &self.0
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, FileMapEntry> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a FileMap {
    type Item = &'a FileMapEntry;
    type IntoIter = std::slice::Iter<'a, FileMapEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
