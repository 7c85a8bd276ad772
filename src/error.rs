use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellmarksError {
    #[error(transparent)]
    Entry(#[from] crate::domain::EntryError),

    #[error(transparent)]
    Registry(#[from] crate::registry::RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ShellmarksError {
    /// True for the errors raised when a mark or path fails validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, ShellmarksError::Entry(e) if e.is_validation())
    }
}

pub type ShellmarksResult<T> = Result<T, ShellmarksError>;
