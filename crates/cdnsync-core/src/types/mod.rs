//! Domain types for catalog libraries.
//!
//! [`AllowedRoot`] can only be built from an absolute, normalized path, so
//! containment checks never have to re-validate their root.

pub mod allowed_root;
pub mod file_map;
pub mod package;

pub use allowed_root::AllowedRoot;
pub use file_map::FileMap;
pub use file_map::FileMapEntry;
pub use package::LibraryPackage;
pub use package::invalid_library_name;
pub use package::invalid_npm_name;
pub use package::registry_name;
