//! Unpacking of release tarballs and import of their files.

pub mod import;
pub mod tarball;

pub use import::import_version;
pub use tarball::find_extracted_root;
pub use tarball::normalize_permissions;
pub use tarball::unpack_tarball;
