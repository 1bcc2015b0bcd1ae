//! Property-based tests for path containment and file map validation.
//!
//! These tests use proptest to generate arbitrary inputs and verify
//! security properties hold across a wide range of cases.

#![allow(clippy::expect_used)]

use cdnsync_core::is_contained;
use cdnsync_core::is_valid_file_map;
use cdnsync_core::security::collapse_separators;
use cdnsync_core::security::is_valid_path;
use cdnsync_core::security::normalize;
use cdnsync_core::types::AllowedRoot;
use cdnsync_core::types::FileMap;
use cdnsync_core::types::FileMapEntry;
use proptest::prelude::*;

fn root(path: &str) -> AllowedRoot {
    AllowedRoot::new(path).expect("valid root")
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9_.-]{1,12}", 0..6)
}

/// Component-wise reference model of containment.
fn model_contains(root: &str, candidate: &str) -> bool {
    let normalized = normalize(candidate);
    let root_parts: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();
    let parts: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    parts.len() >= root_parts.len() && parts[..root_parts.len()] == root_parts[..]
}

proptest! {
    /// Empty candidate lists are vacuously contained.
    #[test]
    fn prop_empty_candidates_contained(parts in prop::collection::vec("[a-z]{1,8}", 0..5)) {
        let root = root(&format!("/{}", parts.join("/")));
        prop_assert!(is_contained(&root, Vec::<String>::new()));
    }

    /// Containment agrees with a segment-wise comparison of normalized paths.
    #[test]
    fn prop_containment_matches_segment_model(
        root_parts in prop::collection::vec("[a-z]{1,6}", 1..4),
        tail in prop::collection::vec(prop_oneof![
            Just("..".to_string()),
            Just(".".to_string()),
            Just(String::new()),
            "[a-z]{1,6}",
        ], 0..8),
    ) {
        let root_str = format!("/{}", root_parts.join("/"));
        let candidate = format!("{root_str}/{}", tail.join("/"));
        let root = root(&root_str);
        prop_assert_eq!(
            is_contained(&root, [candidate.as_str()]),
            model_contains(root.as_str(), &candidate),
            "candidate {}", candidate
        );
    }

    /// A sibling sharing a string prefix with the root is never contained.
    #[test]
    fn prop_prefix_sibling_not_contained(
        base in "[a-z]{1,8}",
        suffix in "[a-z0-9]{1,4}",
        rest in segments(),
    ) {
        let root = root(&format!("/tmp/{base}"));
        let candidate = format!("/tmp/{base}{suffix}/{}", rest.join("/"));
        prop_assert!(!is_contained(&root, [candidate.as_str()]));
    }

    /// Plain descendants of the root are always contained.
    #[test]
    fn prop_descendants_contained(
        parts in prop::collection::vec("[a-zA-Z0-9_-]{1,12}", 0..6),
    ) {
        let root = root("/tmp/x/pkg-1.0.0");
        let candidate = root.join(&parts.join("/"));
        prop_assert!(is_contained(&root, [candidate.as_str()]));
    }

    /// Climbing out with more `..` than there are segments always escapes.
    #[test]
    fn prop_deep_traversal_escapes(
        inner in prop::collection::vec("[a-z]{1,6}", 0..3),
        target in "[a-z]{1,8}",
    ) {
        let root = root("/srv/libs/pkg");
        let climb = "../".repeat(inner.len() + 1);
        let candidate = format!("/srv/libs/pkg/{}/{climb}{target}-evil", inner.join("/"));
        prop_assert!(!is_contained(&root, [candidate.as_str()]));
    }

    /// Normalizing an already-normalized path is a no-op.
    #[test]
    fn prop_normalize_idempotent(path in "(/)?([a-z.]{1,4}/{1,2}){0,6}[a-z.]{0,4}") {
        let once = normalize(&path);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Collapsing separators never leaves a doubled separator.
    #[test]
    fn prop_collapse_removes_repeats(path in "[a-z/]{0,30}") {
        prop_assert!(!collapse_separators(&path).contains("//"));
    }

    /// Any path with a `..` segment is rejected by file map validation.
    #[test]
    fn prop_parent_segment_rejected(
        prefix in prop::collection::vec("[a-z]{1,6}", 0..4),
        suffix in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let mut parts = prefix;
        parts.push("..".to_string());
        parts.extend(suffix);
        let path = parts.join("/");
        prop_assert!(!is_valid_path(&path));

        let map = FileMap::new(vec![FileMapEntry::new(path, ["*.js"])]);
        prop_assert!(!is_valid_file_map(&map));
    }

    /// Plain relative paths, with or without doubled separators, are valid.
    #[test]
    fn prop_plain_relative_paths_valid(
        parts in prop::collection::vec("[a-zA-Z0-9_-]{1,12}", 1..5),
        doubled in any::<bool>(),
        trailing in any::<bool>(),
    ) {
        let sep = if doubled { "//" } else { "/" };
        let mut path = parts.join(sep);
        if trailing {
            path.push('/');
        }
        prop_assert!(is_valid_path(&path), "{} should be valid", path);
    }

    /// Absolute base paths are rejected.
    #[test]
    fn prop_absolute_base_path_rejected(parts in prop::collection::vec("[a-z]{1,8}", 1..4)) {
        let map = FileMap::new(vec![FileMapEntry::new(format!("/{}", parts.join("/")), ["*"])]);
        prop_assert!(!is_valid_file_map(&map));
    }
}
