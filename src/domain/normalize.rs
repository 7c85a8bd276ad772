use regex::Regex;
use std::env;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static MARK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_]+$").expect("mark pattern compiles"));

/// Characters allowed in a bookmark name, as shown in error messages.
pub const MARK_CHARSET: &str = "0-9a-zA-Z_";

/// Normalizes a bookmark path.
///
/// - Replaces a leading `~` or `$HOME` token with `home_dir`.
/// - Strips trailing slashes (a path of only slashes becomes `/`).
/// - Absolutizes the result, but only if it exists on disk. Paths that
///   don't exist are returned as substituted strings.
///
/// An empty path normalizes to an empty string. Normalizing twice gives the
/// same result as normalizing once.
pub fn normalize_path(path: &str, home_dir: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let substituted = replace_home_token(path, "~", home_dir)
        .or_else(|| replace_home_token(path, "$HOME", home_dir))
        .unwrap_or_else(|| path.to_owned());

    let normalized = match substituted.trim_end_matches('/') {
        "" if substituted.starts_with('/') => "/".to_owned(),
        trimmed => trimmed.to_owned(),
    };

    if Path::new(&normalized).exists() {
        if let Some(absolute) = absolutize(Path::new(&normalized)) {
            return absolute.to_string_lossy().into_owned();
        }
    }

    normalized
}

/// Returns true if `mark` is non-empty and consists only of `[0-9A-Za-z_]`.
pub fn check_mark(mark: &str) -> bool {
    MARK_PATTERN.is_match(mark)
}

/// Replaces `token` with `home_dir` when it is the whole path or the first
/// path component. `~bob` or `$HOMEDIR` are left alone.
fn replace_home_token(path: &str, token: &str, home_dir: &str) -> Option<String> {
    let rest = path.strip_prefix(token)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(format!("{home_dir}{rest}"))
    } else {
        None
    }
}

/// Lexical absolute path: joins the working directory for relative paths and
/// folds `.` and `..` without resolving symlinks.
fn absolutize(path: &Path) -> Option<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().ok()?.join(path)
    };

    let mut absolute = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                absolute.pop();
            }
            other => absolute.push(other.as_os_str()),
        }
    }

    Some(absolute)
}
