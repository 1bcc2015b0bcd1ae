//! Path-safety checks.
//!
//! Two layers guard every file operation:
//! - [`is_valid_file_map`] rejects file maps whose paths are not plain
//!   relative paths, before anything is touched.
//! - [`is_contained`] checks that resolved paths stay inside an
//!   [`AllowedRoot`](crate::types::AllowedRoot). [`escapes_on_disk`] repeats
//!   the check after resolving symlinks.

pub mod canonical;
pub mod file_map;
pub mod path;

pub use canonical::escapes_on_disk;
pub use file_map::LintIssue;
pub use file_map::first_invalid_path;
pub use file_map::is_valid_entry;
pub use file_map::is_valid_file_map;
pub use file_map::is_valid_path;
pub use file_map::lint_file_map;
pub use file_map::lint_package;
pub use path::AllowedPathCheck;
pub use path::allowed_path_fn;
pub use path::collapse_separators;
pub use path::has_parent_segment;
pub use path::is_contained;
pub use path::normalize;
