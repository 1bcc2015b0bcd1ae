//! Path-safe import of npm releases into a CDN library catalog.
//!
//! `cdnsync-core` keeps a tree of libraries (`<libs>/<name>/<version>/...`)
//! in sync with npm. Each library's `package.json` names its npm package and
//! an `npmFileMap` selecting which files of a release are published. Both
//! the library name and every file map path are untrusted input, so every
//! read and write is checked against the directory it must stay inside.
//!
//! # Examples
//!
//! ```
//! use cdnsync_core::is_contained;
//! use cdnsync_core::types::AllowedRoot;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = AllowedRoot::new("/tmp/pkg")?;
//! assert!(is_contained(&root, ["/tmp/pkg/dist"]));
//! assert!(!is_contained(&root, ["/tmp/pkg/../../etc/passwd"]));
//! # Ok(())
//! # }
//! ```
//!
//! Updating the whole catalog from a local mirror:
//!
//! ```no_run
//! use cdnsync_core::UpdateConfig;
//! use cdnsync_core::report::NoopProgress;
//! use cdnsync_core::update::MirrorSource;
//! use cdnsync_core::update::discover_libraries;
//! use cdnsync_core::update::run_batch;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UpdateConfig::default();
//! let libraries = discover_libraries(&config.libs_dir, "*")?;
//! let report = run_batch(
//!     libraries,
//!     &MirrorSource::new("/srv/npm"),
//!     &config,
//!     &NoopProgress,
//! )?;
//! println!("{} versions were updated", report.new_versions);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extraction;
pub mod report;
pub mod security;
pub mod types;
pub mod update;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

pub use config::UpdateConfig;
pub use error::PathViolation;
pub use error::Result;
pub use error::UpdateError;
pub use report::BatchReport;
pub use report::ImportReport;
pub use report::LibraryReport;
pub use report::VersionOutcome;
pub use security::AllowedPathCheck;
pub use security::allowed_path_fn;
pub use security::is_contained;
pub use security::is_valid_file_map;
pub use types::invalid_library_name;
pub use types::invalid_npm_name;
