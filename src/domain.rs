mod normalize;

pub use normalize::{MARK_CHARSET, check_mark, normalize_path};

use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static EXPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^export DIR_(.*?)="(.*)"$"#).expect("export line pattern compiles")
});

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error(
        "Invalid mark string: “{0}”. Allowed characters for bookmark names are: “{charset}”.",
        charset = MARK_CHARSET
    )]
    MarkInvalid(String),

    #[error("The path “{0}” doesn’t exist.")]
    NoPath(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("not a bookmark export line: “{0}”")]
    Parse(String),
}

impl EntryError {
    /// Mark and path validation failures, the only errors cleanup drops.
    pub fn is_validation(&self) -> bool {
        matches!(self, EntryError::MarkInvalid(_) | EntryError::NoPath(_))
    }
}

/// Arguments for [`Entry::new`].
///
/// Supply either `entry` (an export line) or both `mark` and `path`.
#[derive(Debug, Clone)]
pub struct EntryArgs {
    pub entry: Option<String>,
    pub mark: Option<String>,
    pub path: Option<String>,
    /// Check the mark charset and that the path is an existing directory.
    /// Defaults to `true`.
    pub validate: bool,
}

impl Default for EntryArgs {
    fn default() -> Self {
        Self {
            entry: None,
            mark: None,
            path: None,
            validate: true,
        }
    }
}

/// One bookmark: a mark bound to a directory path.
///
/// Serialized on disk as `export DIR_<mark>="<path>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub mark: String,
    pub path: String,
}

impl Entry {
    /// Builds an entry from an export line or from a mark and a path.
    ///
    /// The path is always normalized against `home_dir`. With
    /// `validate` set, the mark must match `[0-9A-Za-z_]+` and the path must
    /// be an existing directory.
    ///
    /// # Errors
    /// - [`EntryError::InvalidArgument`] when `entry` is combined with `mark`
    ///   or `path`, or when only one of `mark`/`path` is given
    /// - [`EntryError::Parse`] when `entry` is not an export line
    /// - [`EntryError::MarkInvalid`] / [`EntryError::NoPath`] on failed validation
    pub fn new(args: EntryArgs, home_dir: &str) -> Result<Entry, EntryError> {
        let validate = args.validate;
        let (mark, path) = match args {
            EntryArgs {
                entry: Some(line),
                mark: None,
                path: None,
                ..
            } => Self::split_export_line(&line)?,
            EntryArgs {
                entry: None,
                mark: Some(mark),
                path: Some(path),
                ..
            } => (mark, path),
            _ => {
                return Err(EntryError::InvalidArgument(
                    "Specify entry OR both path and mark.".to_string(),
                ));
            }
        };

        let path = normalize_path(&path, home_dir);

        if validate {
            if !check_mark(&mark) {
                return Err(EntryError::MarkInvalid(mark));
            }
            if !Path::new(&path).is_dir() {
                return Err(EntryError::NoPath(path));
            }
        }

        Ok(Entry { mark, path })
    }

    /// Shortcut for [`Entry::new`] with a mark and a path.
    pub fn from_parts(
        mark: &str,
        path: &str,
        validate: bool,
        home_dir: &str,
    ) -> Result<Entry, EntryError> {
        Self::new(
            EntryArgs {
                mark: Some(mark.to_owned()),
                path: Some(path.to_owned()),
                validate,
                ..Default::default()
            },
            home_dir,
        )
    }

    /// Parses an export line without validating the mark or the path.
    pub fn parse(line: &str, home_dir: &str) -> Result<Entry, EntryError> {
        Self::new(
            EntryArgs {
                entry: Some(line.to_owned()),
                validate: false,
                ..Default::default()
            },
            home_dir,
        )
    }

    /// The on-disk line, without the trailing newline.
    pub fn to_export_string(&self) -> String {
        format!("export DIR_{}=\"{}\"", self.mark, self.path)
    }

    /// A plain `{mark, path}` snapshot.
    pub fn to_dict(&self) -> Value {
        json!({ "mark": self.mark, "path": self.path })
    }

    fn split_export_line(line: &str) -> Result<(String, String), EntryError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let caps = EXPORT_LINE
            .captures(line)
            .ok_or_else(|| EntryError::Parse(line.to_owned()))?;

        Ok((caps[1].to_owned(), caps[2].to_owned()))
    }
}
