//! # shellmarks
//!
//! Manage a directory bookmark file compatible with the shell tools
//! [shellmarks](https://github.com/Bilalh/shellmarks) and
//! [bashmarks](https://github.com/huyng/bashmarks).
//!
//! The bookmark file (usually `~/.sdirs`) holds one bookmark per line:
//!
//! ```text
//! export DIR_<mark>="<path>"
//! ```
//!
//! ## Features
//!
//! - **Entries**: Validated `(mark, path)` pairs with path normalization (`~` and `$HOME` expansion)
//! - **Registry**: Add, update, delete, sort, deduplicate and clean up bookmarks with O(1) lookups
//! - **Change tracking**: A structured change log plus a `changed` flag suitable for dry runs
//! - **Module**: A JSON-driven adapter for idempotent configuration-management runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shellmarks::registry::{AddOptions, ShellmarkManager};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut manager = ShellmarkManager::open("/home/jf/.sdirs", "/home/jf")?;
//!
//! manager.add_entry("ansible", "/etc/ansible", &AddOptions::default())?;
//!
//! if manager.changed() {
//!     manager.write()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **[`domain`]**: The [`Entry`](domain::Entry) value object, path normalization and mark validation
//! - **[`registry`]**: The in-memory registry, its indexes and the file storage
//! - **[`module`]**: One orchestration-tool invocation from parameters to outcome
//! - **[`error`]**: Unified error handling throughout the library
//!
//! ## Error Handling
//!
//! All fallible operations return [`ShellmarksResult<T>`], wrapping the unified
//! [`ShellmarksError`] type, which converts from [`EntryError`](domain::EntryError)
//! and [`RegistryError`](registry::RegistryError) so `?` works everywhere.
//!
//! ```rust
//! use shellmarks::domain::Entry;
//! use shellmarks::ShellmarksResult;
//!
//! fn parse_line(line: &str) -> ShellmarksResult<Entry> {
//!     Ok(Entry::parse(line, "/home/jf")?)
//! }
//!
//! let entry = parse_line(r#"export DIR_etc="/etc""#).unwrap();
//! assert_eq!(entry.mark, "etc");
//! ```

pub mod domain;
pub mod error;
pub mod module;
pub mod registry;

/// Re-exports the most commonly used types for convenience.
pub use error::{ShellmarksError, ShellmarksResult};
