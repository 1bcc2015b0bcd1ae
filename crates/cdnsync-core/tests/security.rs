//! Attack scenarios against containment, name and file map checks.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use cdnsync_core::PathViolation;
use cdnsync_core::UpdateConfig;
use cdnsync_core::UpdateError;
use cdnsync_core::allowed_path_fn;
use cdnsync_core::extraction::import_version;
use cdnsync_core::extraction::unpack_tarball;
use cdnsync_core::invalid_npm_name;
use cdnsync_core::is_contained;
use cdnsync_core::is_valid_file_map;
use cdnsync_core::report::NoopProgress;
use cdnsync_core::test_utils::write_library;
use cdnsync_core::test_utils::write_mirror_version;
use cdnsync_core::test_utils::write_tgz;
use cdnsync_core::types::AllowedRoot;
use cdnsync_core::types::FileMap;
use cdnsync_core::types::LibraryPackage;
use cdnsync_core::update::MirrorSource;
use cdnsync_core::update::discover_libraries;
use cdnsync_core::update::run_batch;
use serde_json::json;
use tempfile::TempDir;

fn pkg_root() -> AllowedRoot {
    AllowedRoot::new("/tmp/x/pkg-1.0.0").unwrap()
}

#[test]
fn test_descendant_contained() {
    assert!(is_contained(&pkg_root(), ["/tmp/x/pkg-1.0.0/dist/file.js"]));
}

#[test]
fn test_parent_escape_to_sibling() {
    assert!(!is_contained(
        &pkg_root(),
        ["/tmp/x/pkg-1.0.0/../pkg-evil/payload.js"]
    ));
}

#[test]
fn test_string_prefix_sibling() {
    assert!(!is_contained(&pkg_root(), ["/tmp/x/pkg-1.0.0x/file.js"]));

    let lib = AllowedRoot::new("/lib").unwrap();
    assert!(!is_contained(&lib, ["/lib2"]));
    assert!(!is_contained(&lib, ["/lib2/file.js"]));
    assert!(is_contained(&lib, ["/lib", "/lib/", "/lib//a"]));
}

#[test]
fn test_one_bad_candidate_fails_all() {
    assert!(!is_contained(
        &pkg_root(),
        ["/tmp/x/pkg-1.0.0/a.js", "/etc/passwd", "/tmp/x/pkg-1.0.0/b.js"]
    ));
}

#[test]
fn test_allowed_path_fn_is_reusable() {
    let allowed = allowed_path_fn(pkg_root());
    assert!(allowed(&["/tmp/x/pkg-1.0.0/dist"]));
    assert!(!allowed(&["/tmp/x/pkg-1.0.0/dist/../../other"]));
    assert!(allowed(&[]));
}

#[test]
fn test_glob_base_path_valid() {
    let map = FileMap::from_value(&json!([{"basePath": "dist", "files": ["**/*"]}])).unwrap();
    assert!(is_valid_file_map(&map));
}

#[test]
fn test_absolute_base_path_invalid() {
    let map = FileMap::from_value(&json!([{"basePath": "/etc", "files": ["passwd"]}])).unwrap();
    assert!(!is_valid_file_map(&map));
}

#[test]
fn test_traversal_in_files_invalid() {
    let map = FileMap::from_value(&json!([
        {"basePath": "dist", "files": ["*.js"]},
        {"basePath": "", "files": ["../../../../etc/shadow"]}
    ]))
    .unwrap();
    assert!(!is_valid_file_map(&map));

    let map = FileMap::from_value(&json!([{"basePath": "../secret", "files": ["*"]}])).unwrap();
    assert!(!is_valid_file_map(&map));

    let map = FileMap::from_value(&json!([{"basePath": "a//b/", "files": ["*"]}])).unwrap();
    assert!(is_valid_file_map(&map));
}

#[test]
fn test_traversal_package_name() {
    assert!(invalid_npm_name("../../evil"));
}

#[test]
fn test_traversal_package_name_skips_whole_update() {
    let temp = TempDir::new().unwrap();
    let mirror = temp.path().join("mirror");
    let config = UpdateConfig {
        libs_dir: temp.path().join("libs"),
        temp_dir: temp.path().join("scratch"),
        ..Default::default()
    };
    fs::create_dir_all(&config.libs_dir).unwrap();
    write_library(
        &config.libs_dir,
        "../evil",
        "evil",
        r#"[{"basePath": "", "files": ["*.js"]}]"#,
    );
    write_mirror_version(&mirror, "evil", "1.0.0", &[("package/a.js", "a")]);

    // The library directory sits outside libs_dir, so it is loaded directly.
    let path = config.libs_dir.join("../evil/package.json");
    let pkg = LibraryPackage::load(&path).unwrap();
    let report = run_batch(vec![pkg], &MirrorSource::new(&mirror), &config, &NoopProgress).unwrap();

    assert_eq!(report.new_versions, 0);
    let library = &report.libraries[0];
    assert!(library.skipped.is_some());
    assert_eq!(library.violations[0].kind, PathViolation::BadPackageName);
    assert!(library.versions.is_empty());
}

#[test]
fn test_absolute_package_name_cannot_redirect_writes() {
    let temp = TempDir::new().unwrap();
    let mirror = temp.path().join("mirror");
    let victim = temp.path().join("victim");
    let config = UpdateConfig {
        libs_dir: temp.path().join("libs"),
        temp_dir: temp.path().join("scratch"),
        ..Default::default()
    };
    let lib_dir = config.libs_dir.join("lib");
    fs::create_dir_all(&lib_dir).unwrap();
    fs::write(
        lib_dir.join("package.json"),
        format!(
            r#"{{"name": "{}", "npmName": "lib", "npmFileMap": [{{"basePath": "", "files": ["*.js"]}}]}}"#,
            victim.display()
        ),
    )
    .unwrap();
    write_mirror_version(&mirror, "lib", "1.0.0", &[("package/x.js", "x")]);

    let pkg = LibraryPackage::load(lib_dir.join("package.json")).unwrap();
    let report = run_batch(vec![pkg], &MirrorSource::new(&mirror), &config, &NoopProgress).unwrap();

    assert_eq!(report.new_versions, 0);
    let library = &report.libraries[0];
    assert!(library.skipped.is_some());
    assert_eq!(library.violations[0].kind, PathViolation::BadPackageName);
    assert!(!victim.exists());
}

#[cfg(unix)]
#[test]
fn test_symlink_in_tarball_not_followed() {
    use cdnsync_core::test_utils::TestEntry;
    use cdnsync_core::test_utils::write_tgz_entries;

    let temp = TempDir::new().unwrap();
    let secret = temp.path().join("secret.txt");
    fs::write(&secret, "secret").unwrap();

    let archive = temp.path().join("dist.tar.gz");
    write_tgz_entries(
        &archive,
        &[
            TestEntry::File("package/dist/ok.js", "ok"),
            TestEntry::Symlink("package/dist/leak.js", secret.to_str().unwrap()),
        ],
    );
    let extract = temp.path().join("extract");
    fs::create_dir(&extract).unwrap();
    unpack_tarball(&archive, &extract).unwrap();

    let config = UpdateConfig {
        libs_dir: temp.path().join("libs"),
        temp_dir: temp.path().join("scratch"),
        ..Default::default()
    };
    let path = write_library(
        &config.libs_dir,
        "lib",
        "lib",
        r#"[{"basePath": "dist", "files": ["*.js"]}]"#,
    );
    let mut pkg = LibraryPackage::load(&path).unwrap();
    let report = import_version(&mut pkg, "1.0.0", &extract, &config).unwrap();

    let dest = config.version_dir("lib", "1.0.0");
    assert!(dest.join("ok.js").is_file());
    assert!(!dest.join("leak.js").exists());
    assert!(report.has_violations());
}

#[test]
fn test_packaged_traversal_map_cannot_escape() {
    let temp = TempDir::new().unwrap();
    let mirror = temp.path().join("mirror");
    let config = UpdateConfig {
        libs_dir: temp.path().join("libs"),
        temp_dir: temp.path().join("scratch"),
        ..Default::default()
    };
    write_library(
        &config.libs_dir,
        "lib",
        "lib",
        r#"[{"basePath": "dist", "files": ["*.js"]}]"#,
    );
    let packaged = r#"{"name": "lib", "npmName": "lib",
        "npmFileMap": [{"basePath": "../../..", "files": ["**/*"]}]}"#;
    write_mirror_version(
        &mirror,
        "lib",
        "1.0.0",
        &[("package/package.json", packaged), ("package/dist/lib.js", "x")],
    );

    let libraries = discover_libraries(&config.libs_dir, "*").unwrap();
    let report =
        run_batch(libraries, &MirrorSource::new(&mirror), &config, &NoopProgress).unwrap();

    assert_eq!(report.new_versions, 1);
    let dest = config.version_dir("lib", "1.0.0");
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);
    assert!(dest.join("lib.js").is_file());
}

#[test]
fn test_corrupt_tarball_reported_not_fatal() {
    let temp = TempDir::new().unwrap();
    let mirror = temp.path().join("mirror");
    let config = UpdateConfig {
        libs_dir: temp.path().join("libs"),
        temp_dir: temp.path().join("scratch"),
        ..Default::default()
    };
    write_library(&config.libs_dir, "a", "a", r#"[{"basePath": "", "files": ["*.js"]}]"#);
    write_library(&config.libs_dir, "b", "b", r#"[{"basePath": "", "files": ["*.js"]}]"#);
    fs::create_dir_all(mirror.join("a")).unwrap();
    fs::write(mirror.join("a/1.0.0.tgz"), "garbage").unwrap();
    write_mirror_version(&mirror, "b", "1.0.0", &[("package/b.js", "b")]);

    let libraries = discover_libraries(&config.libs_dir, "*").unwrap();
    let report =
        run_batch(libraries, &MirrorSource::new(&mirror), &config, &NoopProgress).unwrap();

    assert_eq!(report.new_versions, 1);
    assert!(config.version_dir("b", "1.0.0").join("b.js").is_file());
}

#[test]
fn test_not_extracted_error() {
    let temp = TempDir::new().unwrap();
    let config = UpdateConfig {
        libs_dir: temp.path().join("libs"),
        ..Default::default()
    };
    let path = write_library(&config.libs_dir, "a", "a", r#"[{"files": ["*.js"]}]"#);
    let extract = temp.path().join("empty");
    fs::create_dir(&extract).unwrap();
    write_tgz(&extract.join("dist.tar.gz"), &[]);

    let mut pkg = LibraryPackage::load(&path).unwrap();
    let err = import_version(&mut pkg, "1.0.0", &extract, &config).unwrap_err();
    assert!(matches!(err, UpdateError::NotExtracted { .. }));
}
