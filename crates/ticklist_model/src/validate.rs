//! Field validation.

use crate::error::{ModelError, ModelResult};
use crate::{DEFAULT_PRIORITY, MAX_LIST_NAME_LEN, PRIORITY_HIGH, PRIORITY_LOW};

/// Validates a list name, returning the trimmed form.
///
/// Names must be non-empty and at most [`MAX_LIST_NAME_LEN`] characters
/// after trimming surrounding whitespace.
pub fn validate_list_name(name: &str) -> ModelResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyListName);
    }
    if trimmed.chars().count() > MAX_LIST_NAME_LEN {
        return Err(ModelError::ListNameTooLong(MAX_LIST_NAME_LEN));
    }
    Ok(trimmed.to_string())
}

/// Validates task text, returning the trimmed form.
pub fn validate_task_text(text: &str) -> ModelResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyTaskText);
    }
    Ok(trimmed.to_string())
}

/// Clamps a stored priority to the valid 1-4 range.
///
/// Out-of-range values fall back to [`DEFAULT_PRIORITY`]; legacy databases
/// can contain anything.
pub fn clamp_priority(priority: i64) -> u8 {
    if priority < i64::from(PRIORITY_HIGH) || priority > i64::from(PRIORITY_LOW) {
        DEFAULT_PRIORITY
    } else {
        priority as u8
    }
}
