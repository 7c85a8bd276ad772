use crate::domain::{Entry, EntryError};
use crate::error::ShellmarksResult;
use crate::registry::RegistryError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads a bookmark file into entries, in file order.
///
/// A missing file reads as an empty list. Blank lines are skipped; any other
/// line that is not an export line fails with
/// [`RegistryError::MalformedLine`]. Marks and paths are not validated, so
/// stale or hand-edited files still load.
pub fn load_entries(path: &Path, home_dir: &str) -> ShellmarksResult<Vec<Entry>> {
    let raw = read_raw(path)?;

    let mut entries = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match Entry::parse(line, home_dir) {
            Ok(entry) => entries.push(entry),
            Err(EntryError::Parse(content)) => {
                return Err(RegistryError::MalformedLine {
                    line: number + 1,
                    content,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(entries)
}

/// Returns the file's text, or an empty string if it doesn't exist.
pub fn read_raw(path: &Path) -> ShellmarksResult<String> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(raw),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Serializes entries one export line each, every line ending in `\n`.
///
/// With `home_dir` set, paths at or below it are written as `$HOME/...`.
pub fn render(entries: &[Entry], home_dir: Option<&str>) -> String {
    let mut out = String::new();
    for entry in entries {
        let line = match home_dir {
            Some(home) => Entry {
                mark: entry.mark.clone(),
                path: replace_home(&entry.path, home),
            }
            .to_export_string(),
            None => entry.to_export_string(),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Writes `data` to `path` through a temporary file in the same directory,
/// so the bookmark file is never left half written.
///
/// An existing file is written through symlinks and keeps its permissions.
pub fn write_atomic(path: &Path, data: &[u8]) -> ShellmarksResult<()> {
    let (target, permissions) = match fs::canonicalize(path) {
        Ok(resolved) => {
            let permissions = fs::metadata(&resolved)?.permissions();
            (resolved, Some(permissions))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => (path.to_path_buf(), None),
        Err(e) => return Err(e.into()),
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

fn replace_home(path: &str, home_dir: &str) -> String {
    let home = home_dir.trim_end_matches('/');
    if home.is_empty() {
        return path.to_owned();
    }

    match path.strip_prefix(home) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => format!("$HOME{rest}"),
        _ => path.to_owned(),
    }
}
