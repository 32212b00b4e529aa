//! Directory organization: sorting the entries of a working root into extension or
//! category subdirectories, bulk renaming, extension retagging and restoring.
//!
//! Every operation is a one-shot batch over a fresh, non-recursive scan of the working
//! root. Per-item failures are collected into a [`BatchReport`] and never abort the
//! batch; an operation only returns `Err` when it cannot start at all.
//!
//! Creating a destination directory and moving an entry into it are two separate
//! steps. If the move fails (or the process dies in between) the empty directory is
//! left behind.

use crate::config::{CompiledFilters, Config, ConfigError};
use crate::file_category::{CategoryTable, Classification, extension_of, split_extension};
use crate::rename_pattern::RenamePattern;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Directory that receives whole subdirectories.
pub const FOLDERS_DIR: &str = "Folders";

/// Directory that receives files without an extension in extension mode.
pub const UNKNOWN_DIR: &str = "Unknown";

/// Errors that can occur while organizing a directory.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The item is busy, locked, or not writable.
    #[error("Permission denied for {}: it may be open, locked or read-only", .path.display())]
    PermissionDenied { path: PathBuf },
    /// The item vanished between the scan and the operation.
    #[error("{} no longer exists", .path.display())]
    NotFound { path: PathBuf },
    /// The destination is already taken.
    #[error("Destination already exists: {}", .path.display())]
    PathConflict { path: PathBuf },
    /// The caller asked for something that cannot be done.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Any other I/O failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OrganizeError {
    /// Maps an I/O error on `path` to the matching error kind.
    pub fn from_io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::AlreadyExists | io::ErrorKind::DirectoryNotEmpty => {
                Self::PathConflict { path }
            }
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Result type for directory organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// One immediate child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// The file extension without its dot. Directories have none.
    pub fn extension(&self) -> Option<&str> {
        match self.kind {
            EntryKind::File => extension_of(&self.name),
            EntryKind::Directory => None,
        }
    }
}

/// Which entries a scan returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanKind {
    Files,
    Directories,
    #[default]
    All,
}

impl ScanKind {
    fn matches(self, kind: EntryKind) -> bool {
        match self {
            ScanKind::Files => kind == EntryKind::File,
            ScanKind::Directories => kind == EntryKind::Directory,
            ScanKind::All => true,
        }
    }
}

impl FromStr for ScanKind {
    type Err = OrganizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "files" | "file" => Ok(ScanKind::Files),
            "directories" | "dirs" | "folders" => Ok(ScanKind::Directories),
            "all" => Ok(ScanKind::All),
            other => Err(OrganizeError::InvalidArgument(format!(
                "scan kind should be 'all', 'files' or 'directories', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScanKind::Files => "files",
            ScanKind::Directories => "directories",
            ScanKind::All => "all",
        })
    }
}

/// How [`Organizer::organize`] picks each entry's destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeMode {
    /// One directory per raw extension.
    Extension,
    /// One directory per configured category path.
    Category,
}

impl FromStr for OrganizeMode {
    type Err = OrganizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ext" | "extension" | "extensions" => Ok(OrganizeMode::Extension),
            "cat" | "category" | "categories" => Ok(OrganizeMode::Category),
            other => Err(OrganizeError::InvalidArgument(format!(
                "organize by 'ext' or 'cat', got '{}'",
                other
            ))),
        }
    }
}

/// Entry counts of a directory, by kind and extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Every entry, files and directories.
    pub total: usize,
    pub directories: usize,
    /// File counts keyed by raw extension, leading dot included (".txt").
    pub extensions: BTreeMap<String, usize>,
    /// Files without an extension.
    pub unknown: usize,
}

impl Statistics {
    pub fn files(&self) -> usize {
        self.total - self.directories
    }
}

/// A completed move or rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Name of the entry before the operation.
    pub item: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A per-item failure inside a batch.
#[derive(Debug)]
pub struct Failure {
    /// Name of the entry that could not be processed.
    pub item: String,
    pub error: OrganizeError,
}

impl Failure {
    /// Human-readable reason for the failure.
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}

/// The complete accounting of a batch operation.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<Relocation>,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    fn record(&mut self, item: &str, from: &Path, result: OrganizeResult<PathBuf>) {
        match result {
            Ok(to) => {
                debug!(item, to = %to.display(), "done");
                self.completed.push(Relocation {
                    item: item.to_string(),
                    from: from.to_path_buf(),
                    to,
                });
            }
            Err(error) => {
                warn!(item, %error, "item failed");
                self.failures.push(Failure {
                    item: item.to_string(),
                    error,
                });
            }
        }
    }

    pub fn success_count(&self) -> usize {
        self.completed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Returns the total number of items processed.
    pub fn total_processed(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Per-call selection options for batch operations.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Whether directories take part, not just files.
    pub include_directories: bool,
    /// Exact entry names to leave alone for this call.
    pub exclude: Vec<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            include_directories: true,
            exclude: Vec::new(),
        }
    }
}

impl BatchOptions {
    pub fn files_only() -> Self {
        Self {
            include_directories: false,
            exclude: Vec::new(),
        }
    }

    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Receives progress notifications while a batch runs.
pub trait Progress {
    fn start(&self, _total: usize) {}
    fn advance(&self, _item: &str) {}
    fn finish(&self) {}
}

/// A progress observer that ignores every notification.
pub struct NoProgress;

impl Progress for NoProgress {}

/// Organizes the immediate children of a working root.
pub struct Organizer {
    root: PathBuf,
    categories: CategoryTable,
    filters: CompiledFilters,
    progress: Box<dyn Progress>,
}

impl Organizer {
    /// Creates an organizer with no filters and no progress reporting.
    pub fn new(root: impl Into<PathBuf>, categories: CategoryTable) -> Self {
        Self {
            root: root.into(),
            categories,
            filters: CompiledFilters::default(),
            progress: Box::new(NoProgress),
        }
    }

    /// Creates an organizer from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured filter patterns do not compile.
    pub fn from_config(root: impl Into<PathBuf>, config: Config) -> Result<Self, ConfigError> {
        let (categories, filters) = config.compile()?;
        Ok(Self::new(root, categories).with_filters(filters))
    }

    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Classifies a file name against the configured categories.
    pub fn resolve(&self, file_name: &str) -> Classification {
        self.categories.resolve(file_name)
    }

    /// Lists the immediate children of the working root, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::Io` if the working root cannot be read.
    pub fn scan(&self, kind: ScanKind) -> OrganizeResult<Vec<DirectoryEntry>> {
        let entries = read_entries(&self.root, true).map_err(|source| OrganizeError::Io {
            path: self.root.clone(),
            source,
        })?;
        Ok(entries
            .into_iter()
            .filter(|entry| kind.matches(entry.kind))
            .collect())
    }

    /// Counts every entry of the working root. Filters are not applied.
    pub fn statistics(&self) -> OrganizeResult<Statistics> {
        let mut stats = Statistics::default();
        for entry in self.scan(ScanKind::All)? {
            stats.total += 1;
            if entry.is_dir() {
                stats.directories += 1;
                continue;
            }
            match entry.extension() {
                Some(extension) => {
                    *stats.extensions.entry(format!(".{}", extension)).or_insert(0) += 1;
                }
                None => stats.unknown += 1,
            }
        }
        Ok(stats)
    }

    /// Sorts entries with the given mode into `destination`.
    pub fn organize(
        &self,
        mode: OrganizeMode,
        destination: impl AsRef<Path>,
        options: &BatchOptions,
    ) -> OrganizeResult<BatchReport> {
        match mode {
            OrganizeMode::Extension => self.organize_by_extension(destination, options),
            OrganizeMode::Category => self.organize_by_category(destination, options),
        }
    }

    /// Moves each file into `destination/.<ext>` (or `destination/Unknown`) and, when
    /// directories are included, each directory into `destination/Folders`.
    pub fn organize_by_extension(
        &self,
        destination: impl AsRef<Path>,
        options: &BatchOptions,
    ) -> OrganizeResult<BatchReport> {
        let (target_root, marker) = self.destination(destination.as_ref())?;
        let entries = self.select(options.include_directories, &options.exclude, Some(marker))?;

        Ok(self.run_batch("organize-by-extension", entries, |_, entry| {
            let bucket = match (entry.kind, entry.extension()) {
                (EntryKind::Directory, _) => FOLDERS_DIR.to_string(),
                (EntryKind::File, Some(extension)) => format!(".{}", extension),
                (EntryKind::File, None) => UNKNOWN_DIR.to_string(),
            };
            move_into(entry, &target_root.join(bucket))
        }))
    }

    /// Moves each file into `destination/<Category>/<Sub>/...` (or `destination/Other`)
    /// and, when directories are included, each directory into `destination/Folders`.
    pub fn organize_by_category(
        &self,
        destination: impl AsRef<Path>,
        options: &BatchOptions,
    ) -> OrganizeResult<BatchReport> {
        let (target_root, marker) = self.destination(destination.as_ref())?;
        let entries = self.select(options.include_directories, &options.exclude, Some(marker))?;

        Ok(self.run_batch("organize-by-category", entries, |_, entry| {
            let target_dir = match entry.kind {
                EntryKind::Directory => target_root.join(FOLDERS_DIR),
                EntryKind::File => self
                    .categories
                    .resolve(&entry.name)
                    .dir_components()
                    .iter()
                    .fold(target_root.clone(), |dir, component| dir.join(component)),
            };
            move_into(entry, &target_dir)
        }))
    }

    /// Renames every selected entry from a template, in scan order.
    ///
    /// `{}` stands for the original name and `{n}` for the entry's position. Without a
    /// `{n}` in the template, and with more than one entry to rename, `{n}` is appended
    /// so the new names cannot collide. The original extension is appended last.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidArgument` for an empty template or one containing a
    /// path separator.
    pub fn rename_all(&self, pattern: &str, options: &BatchOptions) -> OrganizeResult<BatchReport> {
        let mut template = RenamePattern::parse(pattern)?;
        let entries = self.select(options.include_directories, &options.exclude, None)?;
        if !template.has_index() && entries.len() > 1 {
            template = template.with_index_suffix();
        }

        Ok(self.run_batch("rename", entries, |index, entry| {
            let new_name = template.render(&entry.name, index, entry.extension());
            let target = self.root.join(new_name);
            rename_exclusive(&entry.path, &target)?;
            Ok(target)
        }))
    }

    /// Swaps the extension of every file whose extension is `current` for `new`,
    /// leaving the stem untouched. Both may be given with or without the leading dot.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidArgument` if either extension is empty.
    pub fn retag_extension(
        &self,
        current: &str,
        new: &str,
        exclude: &[String],
    ) -> OrganizeResult<BatchReport> {
        let current = normalize_extension(current)?;
        let new = normalize_extension(new)?;

        let entries: Vec<_> = self
            .select(false, exclude, None)?
            .into_iter()
            .filter(|entry| {
                entry
                    .extension()
                    .is_some_and(|extension| current[1..] == *extension)
            })
            .collect();

        Ok(self.run_batch("retag-extension", entries, |_, entry| {
            let (stem, _) = split_extension(&entry.name);
            let target = self.root.join(format!("{}{}", stem, new));
            rename_exclusive(&entry.path, &target)?;
            Ok(target)
        }))
    }

    /// Moves everything an organize run put under `destination` back into the working
    /// root, then removes the directories left empty.
    ///
    /// Direct children of `destination/Folders` come back as they are; every file found
    /// anywhere else under `destination` comes back on its own.
    pub fn restore(&self, destination: impl AsRef<Path>) -> OrganizeResult<BatchReport> {
        let (source_root, _) = self.destination(destination.as_ref())?;
        let top = read_entries(&source_root, false).map_err(|source| OrganizeError::Io {
            path: source_root.clone(),
            source,
        })?;

        let mut walk_failures = Vec::new();
        let mut entries = Vec::new();
        for entry in top {
            match entry.kind {
                EntryKind::Directory if entry.name == FOLDERS_DIR => {
                    match read_entries(&entry.path, false) {
                        Ok(children) => entries.extend(children),
                        Err(error) => walk_failures.push(Failure {
                            item: entry.name.clone(),
                            error: OrganizeError::from_io(&entry.path, error),
                        }),
                    }
                }
                EntryKind::Directory => collect_files(&entry, &mut entries, &mut walk_failures),
                EntryKind::File => entries.push(entry),
            }
        }

        let sources: Vec<PathBuf> = entries.iter().map(|entry| entry.path.clone()).collect();
        let mut report = self.run_batch("restore", entries, |_, entry| {
            let target = self.root.join(&entry.name);
            rename_exclusive(&entry.path, &target)?;
            Ok(target)
        });

        // Whatever could not come back stays where it is, empty or not.
        let mut keep: HashSet<PathBuf> = sources
            .into_iter()
            .filter(|source| fs::symlink_metadata(source).is_ok())
            .collect();
        keep.extend(
            walk_failures
                .iter()
                .filter_map(|failure| failure_path(&failure.error).map(Path::to_path_buf)),
        );
        report.failures.extend(walk_failures);

        prune_empty_dirs(&source_root, &keep);
        Ok(report)
    }

    /// Resolves a destination to its directory and to the name of the root child that
    /// holds it, which every call must leave alone.
    fn destination(&self, destination: &Path) -> OrganizeResult<(PathBuf, String)> {
        let root = fs::canonicalize(&self.root).map_err(|source| OrganizeError::Io {
            path: self.root.clone(),
            source,
        })?;
        let target = resolve_path(&root.join(destination))
            .map_err(|e| OrganizeError::from_io(destination, e))?;
        let marker = destination_marker(&root, &target).ok_or_else(|| {
            OrganizeError::InvalidArgument(format!(
                "destination '{}' must name a directory other than the working root",
                destination.display()
            ))
        })?;
        Ok((target, marker))
    }

    /// Scans the root and drops every entry excluded for this call. The exclusion set
    /// is built fresh each time.
    fn select(
        &self,
        include_directories: bool,
        exclude: &[String],
        destination_marker: Option<String>,
    ) -> OrganizeResult<Vec<DirectoryEntry>> {
        let kind = if include_directories {
            ScanKind::All
        } else {
            ScanKind::Files
        };
        let excluded: HashSet<String> = exclude
            .iter()
            .cloned()
            .chain(destination_marker)
            .collect();

        Ok(self
            .scan(kind)?
            .into_iter()
            .filter(|entry| {
                let keep = !excluded.contains(&entry.name) && self.filters.should_include(&entry.name);
                if !keep {
                    debug!(item = %entry.name, "excluded");
                }
                keep
            })
            .collect())
    }

    fn run_batch<F>(&self, operation: &str, entries: Vec<DirectoryEntry>, mut apply: F) -> BatchReport
    where
        F: FnMut(usize, &DirectoryEntry) -> OrganizeResult<PathBuf>,
    {
        let mut report = BatchReport::default();
        self.progress.start(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let result = apply(index, entry);
            report.record(&entry.name, &entry.path, result);
            self.progress.advance(&entry.name);
        }
        self.progress.finish();

        info!(
            operation,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "batch finished"
        );
        report
    }
}

/// Reads the immediate children of `dir`, sorted by name.
///
/// With `follow_links`, a symlink to a directory counts as a directory.
fn read_entries(dir: &Path, follow_links: bool) -> io::Result<Vec<DirectoryEntry>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(dir = %dir.display(), %error, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let is_dir = if follow_links {
            path.is_dir()
        } else {
            entry.file_type().is_ok_and(|file_type| file_type.is_dir())
        };
        found.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            kind: if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
        });
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

fn collect_files(dir: &DirectoryEntry, files: &mut Vec<DirectoryEntry>, failures: &mut Vec<Failure>) {
    let children = match read_entries(&dir.path, false) {
        Ok(children) => children,
        Err(error) => {
            failures.push(Failure {
                item: dir.name.clone(),
                error: OrganizeError::from_io(&dir.path, error),
            });
            return;
        }
    };
    for child in children {
        match child.kind {
            EntryKind::Directory => collect_files(&child, files, failures),
            EntryKind::File => files.push(child),
        }
    }
}

/// Removes `dir` and every directory below it that is (or becomes) empty, except the
/// paths in `keep`.
fn prune_empty_dirs(dir: &Path, keep: &HashSet<PathBuf>) {
    if keep.contains(dir) {
        return;
    }
    if let Ok(children) = read_entries(dir, false) {
        for child in children.iter().filter(|child| child.is_dir()) {
            prune_empty_dirs(&child.path, keep);
        }
    }
    if fs::remove_dir(dir).is_ok() {
        debug!(dir = %dir.display(), "removed empty directory");
    }
}

fn failure_path(error: &OrganizeError) -> Option<&Path> {
    match error {
        OrganizeError::PermissionDenied { path }
        | OrganizeError::NotFound { path }
        | OrganizeError::PathConflict { path }
        | OrganizeError::Io { path, .. } => Some(path),
        OrganizeError::InvalidArgument(_) => None,
    }
}

/// Returns the name of the working-root child that `target` lives in, or `None` when
/// `target` is the working root itself. Both paths must already be resolved.
fn destination_marker(root: &Path, target: &Path) -> Option<String> {
    match target.strip_prefix(root) {
        Ok(relative) => relative.components().find_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }),
        Err(_) => target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
    }
}

/// Canonicalizes the longest existing ancestor of `path` and appends the rest
/// lexically, so paths that do not exist yet still resolve.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(mut resolved) => {
                for component in rest.into_iter().rev() {
                    match component {
                        Component::ParentDir => {
                            resolved.pop();
                        }
                        Component::Normal(name) => resolved.push(name),
                        _ => {}
                    }
                }
                return Ok(resolved);
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                let (Some(parent), Some(last)) = (existing.parent(), existing.components().next_back())
                else {
                    return Err(error);
                };
                rest.push(last);
                existing = parent;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Moves `entry` into `target_dir`, creating the directory first.
fn move_into(entry: &DirectoryEntry, target_dir: &Path) -> OrganizeResult<PathBuf> {
    fs::create_dir_all(target_dir).map_err(|e| OrganizeError::from_io(target_dir, e))?;
    let target = target_dir.join(&entry.name);
    rename_exclusive(&entry.path, &target)?;
    Ok(target)
}

/// Renames `from` to `to`, refusing to replace anything already at `to`. Renaming an
/// entry to itself succeeds without touching it.
fn rename_exclusive(from: &Path, to: &Path) -> OrganizeResult<()> {
    if from == to {
        return Ok(());
    }
    if fs::symlink_metadata(to).is_ok() {
        return Err(OrganizeError::PathConflict {
            path: to.to_path_buf(),
        });
    }
    fs::rename(from, to).map_err(|e| OrganizeError::from_io(from, e))
}

/// Returns `extension` with exactly one leading dot.
fn normalize_extension(extension: &str) -> OrganizeResult<String> {
    let bare = extension.trim_start_matches('.');
    if bare.is_empty() {
        return Err(OrganizeError::InvalidArgument(format!(
            "'{}' is not a file extension",
            extension
        )));
    }
    if bare.chars().any(std::path::is_separator) {
        return Err(OrganizeError::InvalidArgument(format!(
            "extension '{}' must not contain a path separator",
            extension
        )));
    }
    Ok(format!(".{}", bare))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn organizer(temp_dir: &TempDir) -> Organizer {
        let categories = CategoryTable::new().with_leaf("documents", ["txt"]);
        Organizer::new(temp_dir.path(), categories)
    }

    #[test]
    fn test_scan_kinds_and_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("b.txt"), "b").unwrap();
        fs::write(base_path.join("a.txt"), "a").unwrap();
        fs::create_dir(base_path.join("photos")).unwrap();

        let organizer = organizer(&temp_dir);
        let names = |kind| {
            organizer
                .scan(kind)
                .unwrap()
                .into_iter()
                .map(|entry| entry.name)
                .collect::<Vec<_>>()
        };

        assert_eq!(names(ScanKind::All), vec!["a.txt", "b.txt", "photos"]);
        assert_eq!(names(ScanKind::Files), vec!["a.txt", "b.txt"]);
        assert_eq!(names(ScanKind::Directories), vec!["photos"]);
    }

    #[test]
    fn test_scan_unreadable_root_is_io_error() {
        let organizer = Organizer::new("/non/existent/path", CategoryTable::new());
        assert!(matches!(
            organizer.scan(ScanKind::All),
            Err(OrganizeError::Io { .. })
        ));
    }

    #[test]
    fn test_statistics() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        for name in ["a.txt", "b.txt", "c.PDF", "Makefile", ".bashrc"] {
            fs::write(base_path.join(name), "x").unwrap();
        }
        fs::create_dir(base_path.join("sub.dir")).unwrap();

        let stats = organizer(&temp_dir).statistics().unwrap();
        assert_eq!(stats.total, 6);
        assert_eq!(stats.directories, 1);
        assert_eq!(stats.files(), 5);
        assert_eq!(stats.unknown, 2);
        assert_eq!(stats.extensions.get(".txt"), Some(&2));
        assert_eq!(stats.extensions.get(".PDF"), Some(&1));
        assert_eq!(stats.extensions.len(), 2);
    }

    #[test]
    fn test_scan_kind_from_str() {
        assert_eq!("files".parse::<ScanKind>().unwrap(), ScanKind::Files);
        assert_eq!("folders".parse::<ScanKind>().unwrap(), ScanKind::Directories);
        assert_eq!("all".parse::<ScanKind>().unwrap(), ScanKind::All);
        assert!(matches!(
            "everything".parse::<ScanKind>(),
            Err(OrganizeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_organize_mode_from_str() {
        assert_eq!("ext".parse::<OrganizeMode>().unwrap(), OrganizeMode::Extension);
        assert_eq!("cat".parse::<OrganizeMode>().unwrap(), OrganizeMode::Category);
        assert!(matches!(
            "size".parse::<OrganizeMode>(),
            Err(OrganizeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_io_maps_kinds() {
        let path = Path::new("x");
        assert!(matches!(
            OrganizeError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied)),
            OrganizeError::PermissionDenied { .. }
        ));
        assert!(matches!(
            OrganizeError::from_io(path, io::Error::from(io::ErrorKind::NotFound)),
            OrganizeError::NotFound { .. }
        ));
        assert!(matches!(
            OrganizeError::from_io(path, io::Error::from(io::ErrorKind::AlreadyExists)),
            OrganizeError::PathConflict { .. }
        ));
        assert!(matches!(
            OrganizeError::from_io(path, io::Error::other("boom")),
            OrganizeError::Io { .. }
        ));
    }

    #[test]
    fn test_destination_marker() {
        let root = Path::new("/data/downloads");
        assert_eq!(
            destination_marker(root, Path::new("/data/downloads/Out")),
            Some("Out".to_string())
        );
        assert_eq!(
            destination_marker(root, Path::new("/data/downloads/Sorted/x")),
            Some("Sorted".to_string())
        );
        assert_eq!(
            destination_marker(root, Path::new("/elsewhere/Sorted")),
            Some("Sorted".to_string())
        );
        assert_eq!(destination_marker(root, Path::new("/data/downloads")), None);
    }

    #[test]
    fn test_resolve_path_handles_missing_tail() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir(base.join("sub")).unwrap();

        assert_eq!(resolve_path(&base.join("sub")).unwrap(), base.join("sub"));
        assert_eq!(
            resolve_path(&base.join("sub/new/deeper")).unwrap(),
            base.join("sub/new/deeper")
        );
        assert_eq!(resolve_path(&base.join("sub/new/..")).unwrap(), base.join("sub"));
        assert_eq!(resolve_path(&base.join("sub/../sub/.")).unwrap(), base.join("sub"));
    }

    #[test]
    fn test_destination_resolving_to_root_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("sub");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        let organizer = Organizer::new(&root, CategoryTable::new());

        for destination in [
            PathBuf::from("../sub"),
            PathBuf::from("Out/.."),
            root.clone(),
            fs::canonicalize(&root).unwrap(),
        ] {
            let result = organizer.organize_by_extension(&destination, &BatchOptions::default());
            assert!(
                matches!(result, Err(OrganizeError::InvalidArgument(_))),
                "{} should be rejected",
                destination.display()
            );
        }
        assert!(root.join("a.txt").exists());
        assert!(!root.join(".txt").exists());
    }

    #[test]
    fn test_destination_must_not_be_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();

        let result = organizer(&temp_dir).organize_by_extension(".", &BatchOptions::default());
        assert!(matches!(result, Err(OrganizeError::InvalidArgument(_))));
        assert!(temp_dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("mp3").unwrap(), ".mp3");
        assert_eq!(normalize_extension(".mp3").unwrap(), ".mp3");
        assert_eq!(normalize_extension("..mp3").unwrap(), ".mp3");
        assert!(normalize_extension("").is_err());
        assert!(normalize_extension(".").is_err());
        assert!(matches!(
            normalize_extension("../x"),
            Err(OrganizeError::InvalidArgument(_))
        ));
        assert!(matches!(
            normalize_extension("mp4/x"),
            Err(OrganizeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rename_exclusive_to_itself_is_a_no_op() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, "a").unwrap();

        rename_exclusive(&path, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a");
    }

    #[test]
    fn test_prune_empty_dirs_keeps_listed_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let out = temp_dir.path().join("Out");
        fs::create_dir_all(out.join("Folders").join("photos")).unwrap();
        fs::create_dir_all(out.join("Media").join("Images")).unwrap();

        let keep: HashSet<PathBuf> = [out.join("Folders").join("photos")].into_iter().collect();
        prune_empty_dirs(&out, &keep);

        assert!(out.join("Folders").join("photos").is_dir());
        assert!(!out.join("Media").exists());
    }

    #[test]
    fn test_rename_exclusive_refuses_to_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("a.txt");
        let to = temp_dir.path().join("b.txt");
        fs::write(&from, "a").unwrap();
        fs::write(&to, "b").unwrap();

        let result = rename_exclusive(&from, &to);
        assert!(matches!(result, Err(OrganizeError::PathConflict { .. })));
        assert_eq!(fs::read_to_string(&to).unwrap(), "b");
        assert!(from.exists());
    }

    #[test]
    fn test_move_into_creates_nested_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "test content").unwrap();
        let entry = DirectoryEntry {
            name: "test.txt".to_string(),
            path: file_path.clone(),
            kind: EntryKind::File,
        };

        let target_dir = temp_dir.path().join("Out").join("Documents").join("Text");
        let moved = move_into(&entry, &target_dir).expect("Failed to move file");

        assert_eq!(moved, target_dir.join("test.txt"));
        assert!(moved.exists());
        assert!(!file_path.exists());
    }

    #[test]
    fn test_move_into_vanished_entry_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = DirectoryEntry {
            name: "gone.txt".to_string(),
            path: temp_dir.path().join("gone.txt"),
            kind: EntryKind::File,
        };

        let result = move_into(&entry, &temp_dir.path().join("Out"));
        assert!(matches!(result, Err(OrganizeError::NotFound { .. })));
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::default();
        report.record("a", Path::new("a"), Ok(PathBuf::from("Out/a")));
        report.record(
            "b",
            Path::new("b"),
            Err(OrganizeError::PathConflict {
                path: PathBuf::from("Out/b"),
            }),
        );

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.total_processed(), 2);
        assert!(!report.is_complete_success());
        assert_eq!(report.failures[0].item, "b");
        assert!(report.failures[0].reason().contains("already exists"));
    }

    #[test]
    fn test_progress_observer_sees_every_item() {
        use std::cell::RefCell;
        use std::rc::Rc;

        #[derive(Default)]
        struct Recorder {
            events: Rc<RefCell<Vec<String>>>,
        }

        impl Progress for Recorder {
            fn start(&self, total: usize) {
                self.events.borrow_mut().push(format!("start {}", total));
            }
            fn advance(&self, item: &str) {
                self.events.borrow_mut().push(item.to_string());
            }
            fn finish(&self) {
                self.events.borrow_mut().push("finish".to_string());
            }
        }

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        fs::write(temp_dir.path().join("b.bin"), "b").unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let organizer = organizer(&temp_dir).with_progress(Recorder {
            events: Rc::clone(&events),
        });
        organizer
            .organize_by_category("Out", &BatchOptions::default())
            .unwrap();

        assert_eq!(
            *events.borrow(),
            vec!["start 2", "a.txt", "b.bin", "finish"]
        );
    }
}
