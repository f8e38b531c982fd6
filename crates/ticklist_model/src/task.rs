//! Task record.

use crate::ids::generate_client_id;
use crate::DEFAULT_PRIORITY;

/// A single todo task.
///
/// Timestamps are unix seconds with 0 meaning "unset". Tasks are never
/// physically deleted; `deleted` / `deleted_at` mark a soft delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Local row id (0 before the task is persisted).
    pub id: i64,
    /// Stable globally-unique identifier, assigned once at creation and
    /// used to correlate this task across devices.
    pub client_id: String,
    /// Server-assigned id, 0 until the task has been synced.
    pub server_id: i64,
    /// Task text.
    pub todo: String,
    /// Priority 1-4, 1 is highest.
    pub priority: u8,
    /// Completion flag.
    pub done: bool,
    /// Creation time.
    pub date_added: i64,
    /// Completion time, 0 if not completed.
    pub date_completed: i64,
    /// Due date (end of day), 0 if none.
    pub due_date: i64,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Soft-delete time, 0 if live.
    pub deleted_at: i64,
    /// Owning list row id.
    pub list_id: i64,
    /// Version counter, used only for payload shaping.
    pub version: i64,
}

impl Task {
    /// Creates a new unsaved task with a freshly generated client id.
    pub fn new(todo: impl Into<String>, list_id: i64) -> Self {
        Self {
            id: 0,
            client_id: generate_client_id(),
            server_id: 0,
            todo: todo.into(),
            priority: DEFAULT_PRIORITY,
            done: false,
            date_added: 0,
            date_completed: 0,
            due_date: 0,
            deleted: false,
            deleted_at: 0,
            list_id,
            version: 1,
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due_date: i64) -> Self {
        self.due_date = due_date;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_defaults() {
        let task = Task::new("write report", 1);
        assert!(!task.client_id.is_empty());
        assert_eq!(task.id, 0);
        assert_eq!(task.server_id, 0);
        assert_eq!(task.priority, DEFAULT_PRIORITY);
        assert!(!task.done);
        assert!(!task.deleted);
        assert_eq!(task.list_id, 1);
        assert_eq!(task.version, 1);
    }

    #[test]
    fn client_ids_are_unique() {
        let a = Task::new("a", 1);
        let b = Task::new("b", 1);
        assert_ne!(a.client_id, b.client_id);
    }

    #[test]
    fn builder_setters() {
        let task = Task::new("t", 2).with_priority(1).with_due_date(1_700_000_000);
        assert_eq!(task.priority, 1);
        assert_eq!(task.due_date, 1_700_000_000);
    }
}
