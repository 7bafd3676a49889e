//! Backend errors

use std::time::Duration;
use thiserror::Error;

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors a backend call can return
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no share of file {file_id}")]
    NotFound { file_id: String },

    #[error("found {count} shares of file {file_id}, expected one")]
    AmbiguousMatch { file_id: String, count: usize },

    #[error("corrupt share: {0}")]
    CorruptShare(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// The backend simply holds no share of the file
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(file_id: &impl ToString) -> Self {
        Self::NotFound {
            file_id: file_id.to_string(),
        }
    }
}
