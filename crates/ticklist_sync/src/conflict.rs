//! Last-writer-wins reconciliation of inbound task payloads.

use crate::payload::TaskPayload;
use ticklist_model::Task;

/// Decides whether an inbound remote task overwrites the local one.
///
/// The remote side wins only when its `updated_at` is strictly newer;
/// a tie keeps the local task untouched.
///
/// The local side of the comparison is the task's *creation* time, because
/// tasks carry no modification timestamp yet. A local edit to an old task
/// therefore never outranks an incoming remote edit. Fixing that needs a
/// real `updated_at` column; see DESIGN.md.
pub fn remote_wins(remote_updated_at: i64, local_date_added: i64) -> bool {
    remote_updated_at > local_date_added
}

/// Overwrites a local task's mutable fields with the remote payload's.
///
/// Identity fields (row id, client id, server id, creation time) are left
/// alone; everything the user can change travels over.
pub fn apply_remote_fields(task: &mut Task, payload: &TaskPayload) {
    task.todo = payload.todo.clone();
    task.priority = payload.priority;
    task.done = payload.done;
    task.date_completed = payload.date_completed;
    task.due_date = payload.due_date;
    task.deleted = payload.deleted;
    task.deleted_at = payload.deleted_at;
    task.list_id = payload.todo_list_id;
    task.version = payload.version;
}

/// Builds a brand-new local task from a payload this device has never seen.
pub fn task_from_payload(payload: &TaskPayload) -> Task {
    Task {
        id: 0,
        client_id: payload.client_id.clone(),
        server_id: 0,
        todo: payload.todo.clone(),
        priority: payload.priority,
        done: payload.done,
        date_added: payload.date_added,
        date_completed: payload.date_completed,
        due_date: payload.due_date,
        deleted: payload.deleted,
        deleted_at: payload.deleted_at,
        list_id: payload.todo_list_id,
        version: payload.version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_remote_wins() {
        assert!(remote_wins(2000, 1000));
    }

    #[test]
    fn newer_local_wins() {
        assert!(!remote_wins(2000, 3000));
    }

    #[test]
    fn tie_keeps_local() {
        assert!(!remote_wins(2000, 2000));
    }

    #[test]
    fn apply_copies_mutable_fields_only() {
        let mut task = Task::new("old", 1);
        task.id = 42;
        task.client_id = "local-cid".into();
        task.server_id = 9;
        task.date_added = 1111;

        let payload = TaskPayload {
            client_id: "remote-cid".into(),
            todo: "new text".into(),
            priority: 1,
            done: true,
            date_added: 2222,
            date_completed: 333,
            due_date: 444,
            deleted: true,
            deleted_at: 555,
            todo_list_id: 7,
            updated_at: 9999,
            version: 4,
        };

        apply_remote_fields(&mut task, &payload);

        assert_eq!(task.todo, "new text");
        assert_eq!(task.priority, 1);
        assert!(task.done);
        assert_eq!(task.date_completed, 333);
        assert_eq!(task.due_date, 444);
        assert!(task.deleted);
        assert_eq!(task.deleted_at, 555);
        assert_eq!(task.list_id, 7);
        assert_eq!(task.version, 4);

        // Identity stays local.
        assert_eq!(task.id, 42);
        assert_eq!(task.client_id, "local-cid");
        assert_eq!(task.server_id, 9);
        assert_eq!(task.date_added, 1111);
    }

    #[test]
    fn new_task_from_payload_keeps_remote_fields() {
        let payload = TaskPayload {
            client_id: "cid".into(),
            todo: "t".into(),
            priority: 2,
            done: false,
            date_added: 123,
            date_completed: 0,
            due_date: 0,
            deleted: false,
            deleted_at: 0,
            todo_list_id: 1,
            updated_at: 123,
            version: 1,
        };
        let task = task_from_payload(&payload);
        assert_eq!(task.client_id, "cid");
        assert_eq!(task.date_added, 123);
        assert_eq!(task.server_id, 0);
        assert_eq!(task.id, 0);
    }
}
