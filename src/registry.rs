//! The bookmark registry: an ordered list of [`Entry`] values backed by one
//! bookmark file.
//!
//! A [`ShellmarkManager`] lives for a single invocation. It is loaded from a
//! file, mutated by a handful of operations, and optionally written back.
//! Two reverse indexes (mark → positions, path → positions) keep lookups
//! cheap and are consistent with the entry list whenever a public method
//! returns.
//!
//! ```rust,no_run
//! use shellmarks::registry::{AddOptions, EntryQuery, ShellmarkManager, SortKey};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut manager = ShellmarkManager::open("/home/jf/.sdirs", "/home/jf")?;
//!
//! manager.add_entry("etc", "/etc", &AddOptions {
//!     avoid_duplicate_marks: true,
//!     avoid_duplicate_paths: true,
//!     delete_old_entries: true,
//!     silent: false,
//!     ..Default::default()
//! })?;
//! manager.delete_entries(&EntryQuery::by_mark("tmp"))?;
//! manager.sort(SortKey::Mark, false);
//!
//! if manager.changed() {
//!     manager.write()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod index;
pub mod storage;

use crate::domain::{Entry, normalize_path};
use crate::error::ShellmarksResult;
use index::Index;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("The mark ({mark}) and path ({path}) don’t point to the same entries.")]
    Mismatch { mark: String, path: String },

    #[error("Specify a mark, a path or both.")]
    EmptyQuery,

    #[error("attribute_name “{0}” unknown.")]
    UnknownAttribute(String),

    #[error("line {line} is not a bookmark export line: “{content}”")]
    MalformedLine { line: usize, content: String },
}

/// The entry attribute used for sorting and indexing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Mark,
    Path,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Mark => "mark",
            SortKey::Path => "path",
        }
    }

    fn value(self, entry: &Entry) -> &str {
        match self {
            SortKey::Mark => &entry.mark,
            SortKey::Path => &entry.path,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mark" => Ok(SortKey::Mark),
            "path" => Ok(SortKey::Path),
            other => Err(RegistryError::UnknownAttribute(other.to_owned())),
        }
    }
}

/// One record in the change log, serialized as `{"action": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Change {
    Add { mark: String, path: String },
    Delete { mark: String, path: String },
    DeleteDuplicates { count: usize },
    Cleanup { count: usize },
    Sort { sort_by: SortKey, reverse: bool },
}

/// Selects entries by mark, by path, or by both.
///
/// Empty strings count as absent. Paths are normalized the same way stored
/// paths are before the lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntryQuery<'a> {
    pub mark: Option<&'a str>,
    pub path: Option<&'a str>,
}

impl<'a> EntryQuery<'a> {
    pub fn by_mark(mark: &'a str) -> Self {
        Self {
            mark: Some(mark),
            path: None,
        }
    }

    pub fn by_path(path: &'a str) -> Self {
        Self {
            mark: None,
            path: Some(path),
        }
    }

    pub fn by_both(mark: &'a str, path: &'a str) -> Self {
        Self {
            mark: Some(mark),
            path: Some(path),
        }
    }
}

/// New values for [`ShellmarkManager::update_entries`]. `None` (or an empty
/// string) keeps the current value.
#[derive(Debug, Default, Clone)]
pub struct EntryUpdate {
    pub mark: Option<String>,
    pub path: Option<String>,
}

/// Options for [`ShellmarkManager::add_entry`].
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Refuse the add if another entry already uses the mark.
    /// Defaults to `false`.
    pub avoid_duplicate_marks: bool,

    /// Refuse the add if another entry already uses the path.
    /// Defaults to `false`.
    pub avoid_duplicate_paths: bool,

    /// Instead of refusing, delete the conflicting entries first. Only has
    /// an effect together with one of the `avoid_*` flags.
    /// Defaults to `false`.
    pub delete_old_entries: bool,

    /// Validate the mark charset and the path's existence.
    /// Defaults to `true`.
    pub validate: bool,

    /// Don't record an `add` change.
    /// Defaults to `true`.
    pub silent: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            avoid_duplicate_marks: false,
            avoid_duplicate_paths: false,
            delete_old_entries: false,
            validate: true,
            silent: true,
        }
    }
}

/// Options for [`ShellmarkManager::delete_duplicates`].
#[derive(Debug, Clone, Copy)]
pub struct DedupOptions {
    /// Keep only the last entry per mark. Defaults to `true`.
    pub marks: bool,
    /// Keep only the last entry per path. Defaults to `false`.
    pub paths: bool,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            marks: true,
            paths: false,
        }
    }
}

/// Options for [`ShellmarkManager::write_with`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteOptions<'a> {
    /// Write somewhere other than the file the registry was loaded from.
    pub new_path: Option<&'a Path>,
    /// Write paths below the home directory as `$HOME/...`.
    pub replace_home: bool,
}

/// An in-memory bookmark registry bound to one bookmark file.
#[derive(Debug)]
pub struct ShellmarkManager {
    path: PathBuf,
    home_dir: String,
    entries: Vec<Entry>,
    index: Index,
    loaded: Vec<Entry>,
    changes: Vec<Change>,
}

impl ShellmarkManager {
    /// Loads the registry from `path`; a missing file gives an empty registry.
    ///
    /// `home_dir` is used to expand `~` and `$HOME` in paths.
    ///
    /// # Errors
    /// Returns [`RegistryError::MalformedLine`] for lines that aren't export
    /// lines, or an I/O error if the file exists but can't be read.
    pub fn open(path: impl Into<PathBuf>, home_dir: &str) -> ShellmarksResult<Self> {
        let path = path.into();
        let entries = storage::load_entries(&path, home_dir)?;
        info!(path = %path.display(), count = entries.len(), "loaded bookmarks");

        Ok(Self {
            index: Index::build(&entries),
            loaded: entries.clone(),
            entries,
            path,
            home_dir: home_dir.to_owned(),
            changes: Vec::new(),
        })
    }

    /// The bookmark file this registry was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn home_dir(&self) -> &str {
        &self.home_dir
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn get_entry_by_index(&self, position: usize) -> Option<&Entry> {
        self.entries.get(position)
    }

    /// True if the ordered `(mark, path)` list differs from the one loaded.
    ///
    /// The change log is not consulted: deleting and re-adding the same
    /// entry is not a change.
    pub fn changed(&self) -> bool {
        self.entries != self.loaded
    }

    /// Every change recorded so far, oldest first.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Appends a change that is tracked by the caller, such as a sort.
    pub fn record_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Returns the entries matching `query`, in file order.
    ///
    /// # Errors
    /// [`RegistryError::Mismatch`] if mark and path are both given but point
    /// at different entries; [`RegistryError::EmptyQuery`] if neither is given.
    pub fn get_entries(&self, query: &EntryQuery) -> ShellmarksResult<Vec<&Entry>> {
        let positions = self.resolve(query)?;
        Ok(positions.iter().map(|&p| &self.entries[p]).collect())
    }

    /// Adds a bookmark, returning its position, or `None` if a duplicate was
    /// refused.
    ///
    /// The new entry is validated before `delete_old_entries` removes
    /// anything, so a failed add removes nothing.
    ///
    /// # Errors
    /// Propagates [`crate::domain::EntryError::MarkInvalid`] and
    /// [`crate::domain::EntryError::NoPath`] when `validate` is set. Nothing is
    /// changed in that case.
    pub fn add_entry(
        &mut self,
        mark: &str,
        path: &str,
        options: &AddOptions,
    ) -> ShellmarksResult<Option<usize>> {
        let entry = Entry::from_parts(mark, path, options.validate, &self.home_dir)?;

        if options.delete_old_entries {
            if options.avoid_duplicate_marks {
                let positions = self.index.positions(SortKey::Mark, &entry.mark).to_vec();
                self.remove_positions(positions);
            }
            if options.avoid_duplicate_paths {
                let positions = self.index.positions(SortKey::Path, &entry.path).to_vec();
                self.remove_positions(positions);
            }
        }

        if (options.avoid_duplicate_marks && self.index.contains(SortKey::Mark, &entry.mark))
            || (options.avoid_duplicate_paths && self.index.contains(SortKey::Path, &entry.path))
        {
            debug!(mark = %entry.mark, path = %entry.path, "refusing duplicate bookmark");
            return Ok(None);
        }

        let position = self.entries.len();
        self.index.insert(&entry, position);
        debug!(mark = %entry.mark, path = %entry.path, position, "added bookmark");

        if !options.silent {
            self.changes.push(Change::Add {
                mark: entry.mark.clone(),
                path: entry.path.clone(),
            });
        }
        self.entries.push(entry);

        Ok(Some(position))
    }

    /// Sets a new mark and/or path on every entry matching `query`.
    ///
    /// Returns the number of entries touched. No change record is written.
    pub fn update_entries(
        &mut self,
        query: &EntryQuery,
        update: EntryUpdate,
    ) -> ShellmarksResult<usize> {
        let positions = self.resolve(query)?;
        let new_mark = update.mark.filter(|m| !m.is_empty());
        let new_path = update
            .path
            .filter(|p| !p.is_empty())
            .map(|p| normalize_path(&p, &self.home_dir));

        for &position in &positions {
            let entry = &mut self.entries[position];
            if let Some(mark) = &new_mark {
                entry.mark = mark.clone();
            }
            if let Some(path) = &new_path {
                entry.path = path.clone();
            }
            debug!(mark = %entry.mark, path = %entry.path, position, "updated bookmark");
        }

        self.index = Index::build(&self.entries);
        Ok(positions.len())
    }

    /// Deletes every entry matching `query`, recording a `delete` change for
    /// each. Returns `false` if nothing matched.
    pub fn delete_entries(&mut self, query: &EntryQuery) -> ShellmarksResult<bool> {
        let positions = self.resolve(query)?;
        Ok(self.remove_positions(positions) > 0)
    }

    /// Drops duplicate marks and/or paths, keeping the entry that comes last
    /// in file order.
    ///
    /// Every removed entry gets a `delete` change, followed by one
    /// `delete_duplicates` change with the net count. Returns that count.
    pub fn delete_duplicates(&mut self, options: DedupOptions) -> ShellmarksResult<usize> {
        let before = self.entries.len();
        let replay = self.take_entries();

        let add_options = AddOptions {
            avoid_duplicate_marks: options.marks,
            avoid_duplicate_paths: options.paths,
            delete_old_entries: true,
            validate: false,
            ..Default::default()
        };
        for entry in replay {
            self.add_entry(&entry.mark, &entry.path, &add_options)?;
        }

        let count = before - self.entries.len();
        if count > 0 {
            info!(count, "deleted duplicate bookmarks");
            self.changes.push(Change::DeleteDuplicates { count });
        }
        Ok(count)
    }

    /// Drops entries with an invalid mark or a path that is no longer a
    /// directory. Returns the number dropped.
    ///
    /// Only validation failures are swallowed; any other error propagates.
    pub fn cleanup(&mut self) -> ShellmarksResult<usize> {
        let replay = self.take_entries();
        let options = AddOptions::default();

        let mut removed = 0;
        for entry in replay {
            match self.add_entry(&entry.mark, &entry.path, &options) {
                Ok(_) => {}
                Err(e) if e.is_validation() => {
                    debug!(mark = %entry.mark, path = %entry.path, error = %e, "dropping stale bookmark");
                    removed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if removed > 0 {
            info!(count = removed, "cleaned up bookmarks");
            self.changes.push(Change::Cleanup { count: removed });
        }
        Ok(removed)
    }

    /// Stable sort by `key`. Returns whether the order changed.
    ///
    /// No change is recorded here; callers that report sorting use
    /// [`ShellmarkManager::record_change`].
    pub fn sort(&mut self, key: SortKey, reverse: bool) -> bool {
        let before = self.entries.clone();
        self.entries.sort_by(|a, b| {
            let (a, b) = (key.value(a), key.value(b));
            if reverse { b.cmp(a) } else { a.cmp(b) }
        });
        self.index = Index::build(&self.entries);

        let reordered = self.entries != before;
        debug!(sort_by = %key, reverse, reordered, "sorted bookmarks");
        reordered
    }

    /// The file contents this registry would write.
    pub fn render(&self, replace_home: bool) -> String {
        storage::render(&self.entries, replace_home.then_some(self.home_dir.as_str()))
    }

    /// Writes all entries back to the file they were loaded from.
    pub fn write(&self) -> ShellmarksResult<()> {
        self.write_with(&WriteOptions::default())
    }

    /// Writes all entries, one export line each, replacing the whole file.
    pub fn write_with(&self, options: &WriteOptions) -> ShellmarksResult<()> {
        let target = options.new_path.unwrap_or(&self.path);
        storage::write_atomic(target, self.render(options.replace_home).as_bytes())?;
        info!(path = %target.display(), count = self.entries.len(), "wrote bookmarks");
        Ok(())
    }

    /// The current contents of the bookmark file on disk, ignoring any
    /// unsaved changes.
    pub fn get_raw(&self) -> ShellmarksResult<String> {
        storage::read_raw(&self.path)
    }

    fn resolve(&self, query: &EntryQuery) -> Result<Vec<usize>, RegistryError> {
        let mark = query.mark.filter(|m| !m.is_empty());
        let path = query
            .path
            .filter(|p| !p.is_empty())
            .map(|p| normalize_path(p, &self.home_dir));

        self.index.resolve(mark, path.as_deref())
    }

    /// Removes the given positions, highest first, and rebuilds the index.
    /// Delete changes are recorded in file order.
    fn remove_positions(&mut self, mut positions: Vec<usize>) -> usize {
        if positions.is_empty() {
            return 0;
        }

        positions.sort_unstable();
        positions.dedup();

        let mut removed = Vec::with_capacity(positions.len());
        for &position in positions.iter().rev() {
            removed.push(self.entries.remove(position));
        }
        self.index = Index::build(&self.entries);

        for entry in removed.into_iter().rev() {
            debug!(mark = %entry.mark, path = %entry.path, "deleted bookmark");
            self.changes.push(Change::Delete {
                mark: entry.mark,
                path: entry.path,
            });
        }

        positions.len()
    }

    fn take_entries(&mut self) -> Vec<Entry> {
        self.index = Index::default();
        std::mem::take(&mut self.entries)
    }
}
