//! The storage interface shared by the local store and the sync decorator.

use crate::error::StoreResult;
use ticklist_model::{Change, ChangeKind, EntityKind, Task, TodoList};

/// Uniform storage interface consumed by the application layer.
///
/// Two variants implement it: [`crate::LocalStore`] (plain SQLite) and the
/// sync decorator in `ticklist_sync`, which wraps a local store and adds
/// change logging plus remote reconciliation. Callers hold a
/// `dyn DataStore` and do not care which they got.
pub trait DataStore: Send + Sync {
    // Lists

    /// Returns all non-archived lists ordered by display order.
    fn todo_lists(&self) -> StoreResult<Vec<TodoList>>;

    /// Creates a list and returns its row id.
    ///
    /// Display order is assigned as the current list count; the sequence
    /// drifts after deletions, which is accepted.
    fn create_todo_list(&self, name: &str) -> StoreResult<i64>;

    /// Renames a list.
    fn update_todo_list_name(&self, id: i64, name: &str) -> StoreResult<()>;

    /// Archives a list and soft-deletes all its live tasks in one
    /// transaction; if either step fails, neither is committed.
    fn delete_todo_list(&self, id: i64) -> StoreResult<()>;

    /// Archives a list without touching its tasks.
    fn archive_todo_list(&self, id: i64) -> StoreResult<()>;

    /// Restores an archived list.
    fn unarchive_todo_list(&self, id: i64) -> StoreResult<()>;

    // Tasks

    /// Returns all non-deleted tasks ordered by row id.
    fn items(&self) -> StoreResult<Vec<Task>>;

    /// Returns a single non-deleted task by row id.
    fn item_by_id(&self, id: i64) -> StoreResult<Task>;

    /// Returns a task by client id, including soft-deleted tasks.
    ///
    /// Sync reconciliation depends on the distinct
    /// [`crate::StoreError::TaskNotFoundByClientId`] outcome: an unknown
    /// client id means "insert as new", any other error aborts the merge.
    fn item_by_client_id(&self, client_id: &str) -> StoreResult<Task>;

    /// Inserts a task and returns its row id.
    ///
    /// A missing client id is generated; a zero `date_added` is stamped
    /// with the current time (inbound sync inserts carry their own).
    fn save_item(&self, task: &Task) -> StoreResult<i64>;

    /// Updates a task's mutable fields (text, priority, completion, due
    /// date, deletion flag and timestamp, list assignment, version).
    fn update_item(&self, task: &Task) -> StoreResult<()>;

    /// Soft-deletes a task, stamping `deleted_at`.
    fn delete_item(&self, id: i64) -> StoreResult<()>;

    // Sync plumbing

    /// Returns the last successful sync time, 0 if never synced.
    fn last_sync_time(&self) -> StoreResult<i64>;

    /// Persists the last successful sync time.
    fn set_last_sync_time(&self, timestamp: i64) -> StoreResult<()>;

    /// Returns all unsynced change-log entries in timestamp order.
    fn pending_changes(&self) -> StoreResult<Vec<Change>>;

    /// Flags one change-log entry as covered by a successful push.
    fn mark_change_synced(&self, change_id: i64) -> StoreResult<()>;

    /// Appends a change-log entry for a completed local mutation.
    fn log_change(&self, entity: EntityKind, entity_id: i64, kind: ChangeKind) -> StoreResult<()>;
}
