//! Error types for the local store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the local store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No task with the given row id.
    #[error("task not found: {0}")]
    TaskNotFound(i64),

    /// No task with the given client id.
    ///
    /// Kept distinct from [`StoreError::TaskNotFound`] because the sync
    /// reconciliation path branches on it: an unknown client id means the
    /// remote task must be inserted, not merged.
    #[error("no task with client id {0}")]
    TaskNotFoundByClientId(String),

    /// No list with the given row id.
    #[error("list not found: {0}")]
    ListNotFound(i64),
}

impl StoreError {
    /// Returns true if this error means "no matching row".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::TaskNotFound(_)
                | StoreError::TaskNotFoundByClientId(_)
                | StoreError::ListNotFound(_)
        )
    }
}
