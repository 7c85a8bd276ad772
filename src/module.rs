//! The orchestration-tool module: one invocation's worth of registry work.
//!
//! Parameters arrive as JSON, get applied to a [`ShellmarkManager`] in a
//! fixed order, and the result is reported as `changed` / `changes` or as a
//! failure message.

use crate::domain::normalize_path;
use crate::error::ShellmarksResult;
use crate::registry::{
    AddOptions, Change, DedupOptions, EntryQuery, ShellmarkManager, SortKey, WriteOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default location of the bookmark file, shared with shellmarks/bashmarks.
pub const DEFAULT_SDIRS: &str = "~/.sdirs";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

/// Module parameters, with the same names and defaults the playbook uses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModuleParams {
    #[serde(alias = "bookmark")]
    pub mark: Option<String>,

    #[serde(alias = "src")]
    pub path: Option<String>,

    pub state: State,

    /// The bookmark file. `~` and `$HOME` are expanded.
    pub sdirs: String,

    /// Write paths below the home directory as `$HOME/...`.
    pub replace_home: bool,

    /// Sort entries by mark.
    pub sorted: bool,

    /// Keep only the last entry per mark.
    pub delete_duplicates: bool,

    /// Drop entries whose directory is gone.
    pub cleanup: bool,
}

impl Default for ModuleParams {
    fn default() -> Self {
        Self {
            mark: None,
            path: None,
            state: State::Present,
            sdirs: DEFAULT_SDIRS.to_string(),
            replace_home: true,
            sorted: true,
            delete_duplicates: false,
            cleanup: false,
        }
    }
}

/// What the module reports back to the orchestration tool.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ModuleOutcome {
    pub changed: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ModuleOutcome {
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: Some(msg.into()),
            ..Default::default()
        }
    }
}

/// Runs one invocation. Errors are folded into a failed outcome.
///
/// In `check_mode` nothing is written, but `changed` and `changes` are
/// reported as if it had been.
pub fn run(params: &ModuleParams, check_mode: bool, home_dir: &str) -> ModuleOutcome {
    match apply(params, check_mode, home_dir) {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(error = %e, "module failed");
            ModuleOutcome::failure(e.to_string())
        }
    }
}

fn apply(params: &ModuleParams, check_mode: bool, home_dir: &str) -> ShellmarksResult<ModuleOutcome> {
    let sdirs = normalize_path(&params.sdirs, home_dir);
    let mut manager = ShellmarkManager::open(&sdirs, home_dir)?;

    let mark = params.mark.as_deref().filter(|m| !m.is_empty());
    let path = params.path.as_deref().filter(|p| !p.is_empty());

    match (params.state, mark, path) {
        (State::Present, Some(mark), Some(path)) => {
            manager.add_entry(
                mark,
                path,
                &AddOptions {
                    avoid_duplicate_marks: true,
                    avoid_duplicate_paths: true,
                    delete_old_entries: true,
                    silent: false,
                    ..Default::default()
                },
            )?;
        }
        (State::Present, None, None) | (State::Absent, None, None) => {}
        (State::Present, _, _) => {
            return Ok(ModuleOutcome::failure(
                "Both mark and path are required for state=present.",
            ));
        }
        (State::Absent, mark, path) => {
            manager.delete_entries(&EntryQuery { mark, path })?;
        }
    }

    if params.delete_duplicates {
        manager.delete_duplicates(DedupOptions::default())?;
    }

    if params.sorted && manager.sort(SortKey::Mark, false) {
        manager.record_change(Change::Sort {
            sort_by: SortKey::Mark,
            reverse: false,
        });
    }

    if params.cleanup {
        manager.cleanup()?;
    }

    let changed = manager.changed()
        || (params.replace_home && manager.render(true) != manager.get_raw()?);

    if changed && !check_mode {
        manager.write_with(&WriteOptions {
            replace_home: params.replace_home,
            ..Default::default()
        })?;
    }

    info!(sdirs = %sdirs, changed, check_mode, "shellmarks module finished");

    Ok(ModuleOutcome {
        changed,
        changes: if changed {
            manager.changes().to_vec()
        } else {
            Vec::new()
        },
        ..Default::default()
    })
}
