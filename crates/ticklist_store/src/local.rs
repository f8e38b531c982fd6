//! Plain SQLite implementation of [`DataStore`].

use crate::error::{StoreError, StoreResult};
use crate::schema;
use crate::store::DataStore;
use crate::{META_DEVICE_ID, META_LAST_SYNC_TIME};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use ticklist_model::{
    clamp_priority, generate_client_id, unix_now, Change, ChangeKind, EntityKind, Task, TodoList,
};
use tracing::{debug, warn};

/// Local SQLite store.
///
/// One connection guarded by a mutex: the single-writer discipline every
/// caller (UI thread, sync worker threads) serializes through. Opening a
/// store creates missing tables, adds sync columns to pre-sync databases,
/// and repairs orphaned tasks without blocking startup.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Opens an in-memory database, mainly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        schema::create_tables(&conn)?;
        schema::create_sync_tables(&conn)?;
        schema::migrate_sync_columns(&conn)?;

        let repaired = schema::repair_orphaned_tasks(&conn)?;
        if repaired > 0 {
            warn!(repaired, "reassigned orphaned tasks to the default list");
        }
        let remaining = schema::count_orphaned_tasks(&conn)?;
        if remaining > 0 {
            // Startup continues; the rows stay visible under the default list
            // filter and the next open retries the repair.
            warn!(remaining, "orphaned tasks remain after repair");
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Reads one metadata value.
    pub fn get_meta(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM sync_metadata WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Writes one metadata value, replacing any previous one.
    pub fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO sync_metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Returns the persisted device id, generating and storing one on
    /// first use.
    pub fn device_id(&self) -> StoreResult<String> {
        if let Some(id) = self.get_meta(META_DEVICE_ID)? {
            if !id.is_empty() {
                return Ok(id);
            }
        }
        let id = generate_client_id();
        self.set_meta(META_DEVICE_ID, &id)?;
        debug!(device_id = %id, "generated device id");
        Ok(id)
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            todo: row.get(1)?,
            priority: clamp_priority(row.get::<_, i64>(2)?),
            done: row.get(3)?,
            date_added: row.get(4)?,
            date_completed: row.get(5)?,
            due_date: row.get(6)?,
            deleted: row.get(7)?,
            deleted_at: row.get(8)?,
            list_id: row.get(9)?,
            client_id: row.get(10)?,
            server_id: row.get(11)?,
            version: row.get(12)?,
        })
    }

    const TASK_COLUMNS: &'static str = "id, todo, priority, done, date_added, date_completed, \
         due_date, deleted, deleted_at, list_id, COALESCE(client_id, ''), \
         COALESCE(server_id, 0), COALESCE(version, 1)";

    fn list_from_row(row: &Row<'_>) -> rusqlite::Result<TodoList> {
        Ok(TodoList {
            id: row.get(0)?,
            name: row.get(1)?,
            display_order: row.get(2)?,
            archived: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            client_id: row.get(6)?,
            server_id: row.get(7)?,
            version: row.get(8)?,
        })
    }

    const LIST_COLUMNS: &'static str = "id, name, display_order, archived, \
         COALESCE(created_at, 0), COALESCE(updated_at, 0), COALESCE(client_id, ''), \
         COALESCE(server_id, 0), COALESCE(version, 1)";

    /// Rows written before sync columns existed carry no client id; give
    /// them one, persisted so the id stays stable across reads.
    fn backfill_task_client_id(conn: &Connection, task: &mut Task) -> StoreResult<()> {
        if task.client_id.is_empty() {
            task.client_id = generate_client_id();
            conn.execute(
                "UPDATE tasks SET client_id = ?1 WHERE id = ?2",
                params![task.client_id, task.id],
            )?;
        }
        Ok(())
    }

    fn backfill_list_client_id(conn: &Connection, list: &mut TodoList) -> StoreResult<()> {
        if list.client_id.is_empty() {
            list.client_id = generate_client_id();
            conn.execute(
                "UPDATE todo_lists SET client_id = ?1 WHERE id = ?2",
                params![list.client_id, list.id],
            )?;
        }
        Ok(())
    }
}

impl DataStore for LocalStore {
    fn todo_lists(&self) -> StoreResult<Vec<TodoList>> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM todo_lists WHERE archived = 0 ORDER BY display_order",
            Self::LIST_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::list_from_row)?;

        let mut lists = Vec::new();
        for row in rows {
            let mut list = row?;
            Self::backfill_list_client_id(&conn, &mut list)?;
            lists.push(list);
        }
        Ok(lists)
    }

    fn create_todo_list(&self, name: &str) -> StoreResult<i64> {
        let conn = self.conn.lock();
        let now = unix_now();
        conn.execute(
            "INSERT INTO todo_lists (name, display_order, archived, created_at, updated_at, \
             client_id, server_id, version) \
             VALUES (?1, (SELECT COUNT(*) FROM todo_lists), 0, ?2, ?2, ?3, 0, 1)",
            params![name, now, generate_client_id()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_todo_list_name(&self, id: i64, name: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE todo_lists SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, unix_now(), id],
        )?;
        Ok(())
    }

    fn delete_todo_list(&self, id: i64) -> StoreResult<()> {
        let mut conn = self.conn.lock();
        let now = unix_now();
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE todo_lists SET archived = 1, updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        tx.execute(
            "UPDATE tasks SET deleted = 1, deleted_at = ?1 WHERE list_id = ?2 AND deleted = 0",
            params![now, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn archive_todo_list(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE todo_lists SET archived = 1, updated_at = ?1 WHERE id = ?2",
            params![unix_now(), id],
        )?;
        Ok(())
    }

    fn unarchive_todo_list(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE todo_lists SET archived = 0, updated_at = ?1 WHERE id = ?2",
            params![unix_now(), id],
        )?;
        Ok(())
    }

    fn items(&self) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM tasks WHERE deleted = 0 ORDER BY id",
            Self::TASK_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::task_from_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            let mut task = row?;
            Self::backfill_task_client_id(&conn, &mut task)?;
            tasks.push(task);
        }
        Ok(tasks)
    }

    fn item_by_id(&self, id: i64) -> StoreResult<Task> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM tasks WHERE deleted = 0 AND id = ?1",
            Self::TASK_COLUMNS
        );
        let task = conn
            .query_row(&sql, params![id], Self::task_from_row)
            .optional()?;
        match task {
            Some(mut task) => {
                Self::backfill_task_client_id(&conn, &mut task)?;
                Ok(task)
            }
            None => Err(StoreError::TaskNotFound(id)),
        }
    }

    fn item_by_client_id(&self, client_id: &str) -> StoreResult<Task> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM tasks WHERE client_id = ?1 LIMIT 1",
            Self::TASK_COLUMNS
        );
        conn.query_row(&sql, params![client_id], Self::task_from_row)
            .optional()?
            .ok_or_else(|| StoreError::TaskNotFoundByClientId(client_id.to_string()))
    }

    fn save_item(&self, task: &Task) -> StoreResult<i64> {
        let conn = self.conn.lock();
        let client_id = if task.client_id.is_empty() {
            generate_client_id()
        } else {
            task.client_id.clone()
        };
        let date_added = if task.date_added == 0 {
            unix_now()
        } else {
            task.date_added
        };
        conn.execute(
            "INSERT INTO tasks (todo, priority, done, date_added, date_completed, due_date, \
             deleted, deleted_at, list_id, client_id, server_id, version) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                task.todo,
                task.priority,
                task.done,
                date_added,
                task.date_completed,
                task.due_date,
                task.deleted,
                task.deleted_at,
                task.list_id,
                client_id,
                task.server_id,
                task.version,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_item(&self, task: &Task) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE tasks SET todo = ?1, done = ?2, priority = ?3, date_completed = ?4, \
             due_date = ?5, deleted = ?6, deleted_at = ?7, list_id = ?8, version = ?9 \
             WHERE id = ?10",
            params![
                task.todo,
                task.done,
                task.priority,
                task.date_completed,
                task.due_date,
                task.deleted,
                task.deleted_at,
                task.list_id,
                task.version,
                task.id,
            ],
        )?;
        Ok(())
    }

    fn delete_item(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE tasks SET deleted = 1, deleted_at = ?1 WHERE id = ?2",
            params![unix_now(), id],
        )?;
        Ok(())
    }

    fn last_sync_time(&self) -> StoreResult<i64> {
        let value = self.get_meta(META_LAST_SYNC_TIME)?;
        Ok(value
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0))
    }

    fn set_last_sync_time(&self, timestamp: i64) -> StoreResult<()> {
        self.set_meta(META_LAST_SYNC_TIME, &timestamp.to_string())
    }

    fn pending_changes(&self) -> StoreResult<Vec<Change>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, entity_type, entity_id, change_type, timestamp, synced \
             FROM change_log WHERE synced = 0 ORDER BY timestamp, id",
        )?;
        let rows = stmt.query_map([], |row| {
            let entity_str: String = row.get(1)?;
            let kind_str: String = row.get(3)?;
            let entity = EntityKind::parse(&entity_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    format!("unknown entity kind: {entity_str}").into(),
                )
            })?;
            let kind = ChangeKind::parse(&kind_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    format!("unknown change kind: {kind_str}").into(),
                )
            })?;
            Ok(Change {
                id: row.get(0)?,
                entity,
                entity_id: row.get(2)?,
                kind,
                timestamp: row.get(4)?,
                synced: row.get(5)?,
            })
        })?;

        let mut changes = Vec::new();
        for row in rows {
            changes.push(row?);
        }
        Ok(changes)
    }

    fn mark_change_synced(&self, change_id: i64) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE change_log SET synced = 1 WHERE id = ?1",
            params![change_id],
        )?;
        Ok(())
    }

    fn log_change(&self, entity: EntityKind, entity_id: i64, kind: ChangeKind) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO change_log (entity_type, entity_id, change_type, timestamp, synced) \
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![entity.as_str(), entity_id, kind.as_str(), unix_now()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LocalStore {
        LocalStore::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_read_lists() {
        let store = store();
        let a = store.create_todo_list("General").unwrap();
        let b = store.create_todo_list("Work").unwrap();

        let lists = store.todo_lists().unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].id, a);
        assert_eq!(lists[0].name, "General");
        assert_eq!(lists[0].display_order, 0);
        assert_eq!(lists[1].id, b);
        assert_eq!(lists[1].display_order, 1);
        assert!(!lists[0].client_id.is_empty());
    }

    #[test]
    fn archived_lists_are_hidden() {
        let store = store();
        store.create_todo_list("General").unwrap();
        let id = store.create_todo_list("Old").unwrap();

        store.archive_todo_list(id).unwrap();
        let lists = store.todo_lists().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "General");

        store.unarchive_todo_list(id).unwrap();
        assert_eq!(store.todo_lists().unwrap().len(), 2);
    }

    #[test]
    fn save_and_read_tasks() {
        let store = store();
        let list_id = store.create_todo_list("General").unwrap();
        let id = store
            .save_item(&Task::new("buy milk", list_id).with_priority(2))
            .unwrap();

        let items = store.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].todo, "buy milk");
        assert_eq!(items[0].priority, 2);
        assert!(items[0].date_added > 0);
        assert!(!items[0].client_id.is_empty());
    }

    #[test]
    fn save_preserves_inbound_fields() {
        // Inserts performed while applying a pull carry their own
        // client id and creation time; they must not be restamped.
        let store = store();
        let list_id = store.create_todo_list("General").unwrap();
        let mut task = Task::new("from remote", list_id);
        task.client_id = "remote-uuid".into();
        task.date_added = 1_600_000_000;
        task.done = true;

        store.save_item(&task).unwrap();
        let saved = store.item_by_client_id("remote-uuid").unwrap();
        assert_eq!(saved.date_added, 1_600_000_000);
        assert!(saved.done);
    }

    #[test]
    fn item_by_client_id_distinct_not_found() {
        let store = store();
        let err = store.item_by_client_id("missing").unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFoundByClientId(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn update_persists_all_mutable_fields() {
        let store = store();
        let list_id = store.create_todo_list("General").unwrap();
        let id = store.save_item(&Task::new("t", list_id)).unwrap();

        let mut task = store.item_by_id(id).unwrap();
        task.todo = "renamed".into();
        task.done = true;
        task.priority = 1;
        task.date_completed = 123;
        task.due_date = 456;
        task.version = 7;
        store.update_item(&task).unwrap();

        let read = store.item_by_id(id).unwrap();
        assert_eq!(read.todo, "renamed");
        assert!(read.done);
        assert_eq!(read.priority, 1);
        assert_eq!(read.date_completed, 123);
        assert_eq!(read.due_date, 456);
        assert_eq!(read.version, 7);
    }

    #[test]
    fn soft_delete_hides_but_keeps_row() {
        let store = store();
        let list_id = store.create_todo_list("General").unwrap();
        let id = store.save_item(&Task::new("gone", list_id)).unwrap();
        let client_id = store.item_by_id(id).unwrap().client_id;

        store.delete_item(id).unwrap();

        assert!(store.items().unwrap().is_empty());
        assert!(matches!(
            store.item_by_id(id),
            Err(StoreError::TaskNotFound(_))
        ));

        // Still reachable by client id for sync reconciliation.
        let deleted = store.item_by_client_id(&client_id).unwrap();
        assert!(deleted.deleted);
        assert!(deleted.deleted_at > 0);
    }

    #[test]
    fn delete_list_soft_deletes_its_tasks_atomically() {
        let store = store();
        let keep = store.create_todo_list("Keep").unwrap();
        let doomed = store.create_todo_list("Drop").unwrap();
        store.save_item(&Task::new("keep me", keep)).unwrap();
        store.save_item(&Task::new("a", doomed)).unwrap();
        store.save_item(&Task::new("b", doomed)).unwrap();

        store.delete_todo_list(doomed).unwrap();

        let items = store.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].todo, "keep me");
        assert_eq!(store.todo_lists().unwrap().len(), 1);
    }

    #[test]
    fn priority_clamped_on_read() {
        let store = store();
        let list_id = store.create_todo_list("General").unwrap();
        {
            let conn = store.conn.lock();
            conn.execute(
                "INSERT INTO tasks (todo, priority, list_id, client_id) VALUES ('bad', 9, ?1, 'x')",
                params![list_id],
            )
            .unwrap();
        }
        let items = store.items().unwrap();
        assert_eq!(items[0].priority, ticklist_model::DEFAULT_PRIORITY);
    }

    #[test]
    fn legacy_rows_get_stable_client_ids() {
        let store = store();
        let list_id = store.create_todo_list("General").unwrap();
        {
            let conn = store.conn.lock();
            conn.execute(
                "INSERT INTO tasks (todo, list_id) VALUES ('legacy', ?1)",
                params![list_id],
            )
            .unwrap();
        }

        let first = store.items().unwrap()[0].client_id.clone();
        assert!(!first.is_empty());
        let second = store.items().unwrap()[0].client_id.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn change_log_roundtrip() {
        let store = store();
        store.log_change(EntityKind::Task, 1, ChangeKind::Create).unwrap();
        store.log_change(EntityKind::List, 2, ChangeKind::Update).unwrap();

        let pending = store.pending_changes().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].entity, EntityKind::Task);
        assert_eq!(pending[0].kind, ChangeKind::Create);
        assert!(!pending[0].synced);

        store.mark_change_synced(pending[0].id).unwrap();
        let pending = store.pending_changes().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].entity, EntityKind::List);
    }

    #[test]
    fn last_sync_time_defaults_to_zero() {
        let store = store();
        assert_eq!(store.last_sync_time().unwrap(), 0);
        store.set_last_sync_time(1_700_000_000).unwrap();
        assert_eq!(store.last_sync_time().unwrap(), 1_700_000_000);
    }

    #[test]
    fn device_id_is_generated_once() {
        let store = store();
        let first = store.device_id().unwrap();
        assert!(!first.is_empty());
        assert_eq!(store.device_id().unwrap(), first);
    }

    #[test]
    fn reopen_preserves_data_and_repairs_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.db");

        {
            let store = LocalStore::open(&path).unwrap();
            store.create_todo_list("General").unwrap();
            store.save_item(&Task::new("persisted", 1)).unwrap();
        }

        // Simulate a legacy row with a broken list reference.
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("INSERT INTO tasks (todo, list_id) VALUES ('orphan', 0)", [])
                .unwrap();
        }

        let store = LocalStore::open(&path).unwrap();
        let items = store.items().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|t| t.list_id == 1));
    }
}
