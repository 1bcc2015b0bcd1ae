//! Lexical path normalization and containment checks.
//!
//! Everything in this module works on `/`-separated strings and never touches
//! the filesystem. It therefore cannot be fooled by a path that does not exist
//! yet, and it does not follow symlinks either; see
//! [`canonical`](super::canonical) for the filesystem-aware pass.

use crate::types::AllowedRoot;

/// Collapses runs of `/` into a single separator.
///
/// # Examples
///
/// ```
/// use cdnsync_core::security::collapse_separators;
///
/// assert_eq!(collapse_separators("a//b///c/"), "a/b/c/");
/// ```
#[must_use]
pub fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_sep {
                out.push(c);
            }
            prev_sep = true;
        } else {
            out.push(c);
            prev_sep = false;
        }
    }
    out
}

/// Lexically normalizes a `/`-separated path.
///
/// - Repeated separators collapse to one.
/// - `.` segments are removed.
/// - `..` removes the preceding segment. Above the root of an absolute path
///   it is dropped; at the start of a relative path it is kept.
/// - A trailing separator is preserved.
/// - An empty path normalizes to `.`.
///
/// Normalizing an already normalized path returns it unchanged.
///
/// # Examples
///
/// ```
/// use cdnsync_core::security::normalize;
///
/// assert_eq!(normalize("/tmp/x/pkg/../evil"), "/tmp/x/evil");
/// assert_eq!(normalize("../secret"), "../secret");
/// assert_eq!(normalize("/../../etc"), "/etc");
/// assert_eq!(normalize("a/./b//"), "a/b/");
/// assert_eq!(normalize(""), ".");
/// ```
#[must_use]
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(path.len());
    if absolute {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    if segments.is_empty() && !absolute {
        out.push('.');
    }
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Returns `true` if `path` contains a `..` segment.
#[must_use]
pub fn has_parent_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}

/// Splits a normalized absolute path into its non-empty segments.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Returns `true` if every candidate resolves at or beneath `root`.
///
/// Relative candidates are resolved against the root, so an empty candidate
/// denotes the root itself. Each candidate is normalized lexically and then
/// compared segment by segment, which keeps `/lib2` out of `/lib`. An empty
/// candidate list is vacuously contained.
///
/// # Examples
///
/// ```
/// use cdnsync_core::security::is_contained;
/// use cdnsync_core::types::AllowedRoot;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = AllowedRoot::new("/tmp/x/pkg-1.0.0")?;
///
/// assert!(is_contained(&root, ["/tmp/x/pkg-1.0.0/dist/file.js"]));
/// assert!(!is_contained(&root, ["/tmp/x/pkg-1.0.0/../pkg-evil/payload.js"]));
/// assert!(!is_contained(&root, ["/tmp/x/pkg-1.0.0x/file.js"]));
/// assert!(is_contained(&root, Vec::<&str>::new()));
/// # Ok(())
/// # }
/// ```
pub fn is_contained<I, S>(root: &AllowedRoot, candidates: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .all(|candidate| is_single_contained(root, candidate.as_ref()))
}

fn is_single_contained(root: &AllowedRoot, candidate: &str) -> bool {
    if candidate.contains('\0') {
        return false;
    }

    let resolved = if candidate.starts_with('/') {
        normalize(candidate)
    } else {
        normalize(&format!("{}/{candidate}", root.as_str()))
    };

    let mut resolved_segments = segments(&resolved);
    segments(root.as_str()).all(|root_segment| resolved_segments.next() == Some(root_segment))
}

/// A containment check pre-bound to one [`AllowedRoot`].
///
/// Built once per extraction and consulted immediately before every read or
/// write, re-validating the fully resolved path.
///
/// # Examples
///
/// ```
/// use cdnsync_core::security::AllowedPathCheck;
/// use cdnsync_core::types::AllowedRoot;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let check = AllowedPathCheck::new(AllowedRoot::new("/tmp/pkg/package")?);
/// assert!(check.is_allowed(["/tmp/pkg/package/dist", "/tmp/pkg/package/lib/a.js"]));
/// assert!(!check.is_allowed(["/tmp/pkg/package/dist", "/tmp/pkg/other"]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AllowedPathCheck {
    root: AllowedRoot,
}

impl AllowedPathCheck {
    /// Binds a check to `root`.
    #[must_use]
    pub fn new(root: AllowedRoot) -> Self {
        Self { root }
    }

    /// Returns the bound root.
    #[must_use]
    pub fn root(&self) -> &AllowedRoot {
        &self.root
    }

    /// Returns `true` if all candidates stay within the bound root.
    pub fn is_allowed<I, S>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        is_contained(&self.root, candidates)
    }
}

/// Returns a closure over `root` answering whether all given paths are
/// contained in it.
///
/// # Examples
///
/// ```
/// use cdnsync_core::security::allowed_path_fn;
/// use cdnsync_core::types::AllowedRoot;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let is_allowed_path = allowed_path_fn(AllowedRoot::new("/srv/lib")?);
/// assert!(is_allowed_path(&["/srv/lib/a.js"]));
/// assert!(!is_allowed_path(&["/srv/lib2/a.js"]));
/// # Ok(())
/// # }
/// ```
pub fn allowed_path_fn(root: AllowedRoot) -> impl Fn(&[&str]) -> bool + Send + Sync {
    let check = AllowedPathCheck::new(root);
    move |candidates: &[&str]| check.is_allowed(candidates)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn root(path: &str) -> AllowedRoot {
        AllowedRoot::new(path).expect("valid root")
    }

    #[test]
    fn test_collapse_separators() {
        assert_eq!(collapse_separators(""), "");
        assert_eq!(collapse_separators("a"), "a");
        assert_eq!(collapse_separators("//a"), "/a");
        assert_eq!(collapse_separators("a//b/"), "a/b/");
        assert_eq!(collapse_separators("a////b"), "a/b");
    }

    #[test]
    fn test_normalize_matches_posix_semantics() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//"), "/");
        assert_eq!(normalize("."), ".");
        assert_eq!(normalize("./"), "./");
        assert_eq!(normalize(".."), "..");
        assert_eq!(normalize("a/.."), ".");
        assert_eq!(normalize("a/../"), "./");
        assert_eq!(normalize("a/b/../../.."), "..");
        assert_eq!(normalize("/a/b/../../.."), "/");
        assert_eq!(normalize("./dist"), "dist");
        assert_eq!(normalize("a//b/"), "a/b/");
        assert_eq!(normalize("**/*"), "**/*");
        assert_eq!(normalize("../../x/../y"), "../../y");
    }

    #[test]
    fn test_normalize_idempotent() {
        for path in ["/a/b", "a/b/", "..", "../a", "/", ".", "./", "**/*.js"] {
            let once = normalize(path);
            assert_eq!(normalize(&once), once, "normalize not idempotent on {path}");
        }
    }

    #[test]
    fn test_has_parent_segment() {
        assert!(has_parent_segment(".."));
        assert!(has_parent_segment("a/../b"));
        assert!(!has_parent_segment("a/..b/c"));
        assert!(!has_parent_segment("a..b"));
    }

    #[test]
    fn test_contained_scenarios() {
        let r = root("/tmp/x/pkg-1.0.0");
        assert!(is_contained(&r, ["/tmp/x/pkg-1.0.0/dist/file.js"]));
        assert!(!is_contained(&r, ["/tmp/x/pkg-1.0.0/../pkg-evil/payload.js"]));
        assert!(!is_contained(&r, ["/tmp/x/pkg-1.0.0x/file.js"]));
    }

    #[test]
    fn test_contained_root_itself() {
        let r = root("/tmp/x/pkg");
        assert!(is_contained(&r, ["/tmp/x/pkg"]));
        assert!(is_contained(&r, ["/tmp/x/pkg/"]));
        assert!(is_contained(&r, ["/tmp//x/./pkg"]));
        assert!(is_contained(&r, [""]));
    }

    #[test]
    fn test_contained_empty_list() {
        let r = root("/tmp/x/pkg");
        assert!(is_contained(&r, Vec::<String>::new()));
    }

    #[test]
    fn test_contained_relative_candidates_resolve_against_root() {
        let r = root("/tmp/x/pkg");
        assert!(is_contained(&r, ["dist/a.js"]));
        assert!(is_contained(&r, ["dist/../lib/a.js"]));
        assert!(!is_contained(&r, ["../sibling"]));
        assert!(!is_contained(&r, ["dist/../../sibling"]));
    }

    #[test]
    fn test_contained_all_must_pass() {
        let r = root("/srv/lib");
        assert!(is_contained(&r, ["/srv/lib/a", "/srv/lib/b/c"]));
        assert!(!is_contained(&r, ["/srv/lib/a", "/srv/lib2/b"]));
    }

    #[test]
    fn test_contained_null_byte_rejected() {
        let r = root("/srv/lib");
        assert!(!is_contained(&r, ["/srv/lib/a\0.js"]));
    }

    #[test]
    fn test_filesystem_root_contains_everything_absolute() {
        let r = root("/");
        assert!(is_contained(&r, ["/etc/passwd"]));
        assert!(is_contained(&r, ["/../../etc"]));
    }

    #[test]
    fn test_allowed_path_check() {
        let check = AllowedPathCheck::new(root("/srv/lib"));
        assert_eq!(check.root().as_str(), "/srv/lib");
        assert!(check.is_allowed(["/srv/lib/x"]));
        assert!(!check.is_allowed(["/srv"]));
    }

    #[test]
    fn test_allowed_path_fn_closure() {
        let is_allowed_path = allowed_path_fn(root("/srv/lib"));
        assert!(is_allowed_path(&[]));
        assert!(is_allowed_path(&["/srv/lib/a", "/srv/lib/b"]));
        assert!(!is_allowed_path(&["/srv/lib/../etc"]));
    }
}
