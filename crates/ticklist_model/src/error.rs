//! Error types for model validation.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Validation failures on user-supplied fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// List name was empty after trimming.
    #[error("list name cannot be empty")]
    EmptyListName,

    /// List name exceeded the length limit.
    #[error("list name cannot exceed {0} characters")]
    ListNameTooLong(usize),

    /// Task text was empty after trimming.
    #[error("task cannot be empty")]
    EmptyTaskText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ModelError::EmptyListName.to_string(),
            "list name cannot be empty"
        );
        assert!(ModelError::ListNameTooLong(100).to_string().contains("100"));
    }
}
