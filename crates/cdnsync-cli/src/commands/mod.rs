//! Subcommand implementations.

pub mod check;
pub mod completion;
pub mod contains;
pub mod import;
pub mod update;
