use thiserror::Error;

/// Errors surfaced by the data core. `Validation` and `Duplicate` messages
/// are user-presentable as-is; `Storage` wraps whatever the backend failed
/// with and is opaque to callers.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DataError {
    pub fn is_validation(&self) -> bool {
        matches!(self, DataError::Validation(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DataError::Duplicate(_))
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
