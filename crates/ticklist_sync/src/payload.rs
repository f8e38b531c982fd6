//! JSON wire payloads for the pull/push protocol.

use serde::{Deserialize, Serialize};
use ticklist_model::{Task, TodoList};

/// A task as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Stable cross-device identifier.
    pub client_id: String,
    /// Task text.
    pub todo: String,
    /// Priority 1-4.
    pub priority: u8,
    /// Completion flag.
    pub done: bool,
    /// Creation time.
    pub date_added: i64,
    /// Completion time, 0 if not completed.
    pub date_completed: i64,
    /// Due date, 0 if none.
    pub due_date: i64,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Soft-delete time.
    pub deleted_at: i64,
    /// Owning list id.
    pub todo_list_id: i64,
    /// Last modification time as the sender knows it.
    pub updated_at: i64,
    /// Version counter.
    pub version: i64,
}

impl From<&Task> for TaskPayload {
    fn from(task: &Task) -> Self {
        Self {
            client_id: task.client_id.clone(),
            todo: task.todo.clone(),
            priority: task.priority,
            done: task.done,
            date_added: task.date_added,
            date_completed: task.date_completed,
            due_date: task.due_date,
            deleted: task.deleted,
            deleted_at: task.deleted_at,
            todo_list_id: task.list_id,
            // Tasks carry no modification timestamp yet; creation time is
            // the best available stand-in and what the merge on the other
            // side compares against.
            updated_at: task.date_added,
            version: task.version,
        }
    }
}

/// A todo list as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPayload {
    /// Stable cross-device identifier.
    pub client_id: String,
    /// Display name.
    pub name: String,
    /// Insertion-order position.
    pub display_order: i64,
    /// Archived flag.
    pub archived: bool,
    /// Last modification time.
    pub updated_at: i64,
    /// Version counter.
    pub version: i64,
}

impl From<&TodoList> for ListPayload {
    fn from(list: &TodoList) -> Self {
        Self {
            client_id: list.client_id.clone(),
            name: list.name.clone(),
            display_order: list.display_order,
            archived: list.archived,
            updated_at: list.updated_at,
            version: list.version,
        }
    }
}

/// Body of `POST /sync/pull`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Return changes with a server-side timestamp greater than this.
    pub since: i64,
}

/// Response of `POST /sync/pull`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullResponse {
    /// Changed tasks.
    #[serde(default)]
    pub tasks: Vec<TaskPayload>,
    /// Changed lists.
    #[serde(default)]
    pub lists: Vec<ListPayload>,
}

/// Body of `POST /sync/push`: the full visible local state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    /// All visible local tasks.
    pub tasks: Vec<TaskPayload>,
    /// All visible local lists.
    pub lists: Vec<ListPayload>,
}
