//! dirsort - sort a cluttered folder into extension or category subdirectories
//!
//! This library provides a nested category table resolved by file extension, an
//! organizer that moves, renames and retags the entries of a working directory while
//! reporting every per-item failure, and the configuration and output layers used by
//! the `dirsort` binary.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod rename_pattern;

pub use config::{CompiledFilters, Config, ConfigError, FilterRules};
pub use file_category::{CategoryNode, CategoryTable, Classification};
pub use file_organizer::{
    BatchOptions, BatchReport, DirectoryEntry, EntryKind, Failure, OrganizeError, OrganizeMode,
    Organizer, Progress, Relocation, ScanKind, Statistics,
};
pub use rename_pattern::RenamePattern;
