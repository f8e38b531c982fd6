//! Schema creation, migration, and startup integrity repair.

use crate::error::StoreResult;
use rusqlite::{params, Connection, OptionalExtension};
use ticklist_model::DEFAULT_LIST_ID;

/// Creates the base tables if they do not exist.
pub(crate) fn create_tables(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS todo_lists (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          display_order INTEGER DEFAULT 0,
          archived BOOLEAN DEFAULT 0,
          created_at INTEGER,
          updated_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS tasks (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          todo TEXT NOT NULL,
          priority INTEGER DEFAULT 4,
          done BOOLEAN DEFAULT 0,
          date_added INTEGER,
          date_completed INTEGER DEFAULT 0,
          due_date INTEGER DEFAULT 0,
          deleted BOOLEAN DEFAULT 0,
          deleted_at INTEGER DEFAULT 0,
          list_id INTEGER DEFAULT 1,
          FOREIGN KEY (list_id) REFERENCES todo_lists(id)
        );
        "#,
    )?;
    Ok(())
}

/// Creates the change log and sync metadata tables if they do not exist.
pub(crate) fn create_sync_tables(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sync_metadata (
          key TEXT PRIMARY KEY,
          value TEXT
        );

        CREATE TABLE IF NOT EXISTS change_log (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          entity_type TEXT NOT NULL,
          entity_id INTEGER NOT NULL,
          change_type TEXT NOT NULL,
          timestamp INTEGER NOT NULL,
          synced BOOLEAN DEFAULT 0
        );
        "#,
    )?;
    Ok(())
}

/// Returns true if `table` has a column named `column`.
fn column_exists(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM pragma_table_info(?1) WHERE name = ?2",
            params![table, column],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name.is_some())
}

/// Adds sync columns to databases created before sync existed.
///
/// Each column is probed individually so a partially migrated database
/// (interrupted upgrade) finishes cleanly.
pub(crate) fn migrate_sync_columns(conn: &Connection) -> StoreResult<()> {
    const COLUMNS: [(&str, &str, &str); 6] = [
        ("todo_lists", "client_id", "TEXT"),
        ("todo_lists", "server_id", "INTEGER DEFAULT 0"),
        ("todo_lists", "version", "INTEGER DEFAULT 1"),
        ("tasks", "client_id", "TEXT"),
        ("tasks", "server_id", "INTEGER DEFAULT 0"),
        ("tasks", "version", "INTEGER DEFAULT 1"),
    ];

    for (table, column, definition) in COLUMNS {
        if !column_exists(conn, table, column)? {
            conn.execute_batch(&format!(
                "ALTER TABLE {table} ADD COLUMN {column} {definition}"
            ))?;
        }
    }
    Ok(())
}

/// Reassigns tasks with a missing owning list to the default list.
///
/// Returns the number of repaired rows.
pub(crate) fn repair_orphaned_tasks(conn: &Connection) -> StoreResult<usize> {
    let repaired = conn.execute(
        "UPDATE tasks SET list_id = ?1 WHERE list_id IS NULL OR list_id = 0",
        params![DEFAULT_LIST_ID],
    )?;
    Ok(repaired)
}

/// Counts live tasks still lacking a valid owning list after repair.
pub(crate) fn count_orphaned_tasks(conn: &Connection) -> StoreResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE deleted = 0 AND (list_id IS NULL OR list_id = 0)",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_sync_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn migration_adds_missing_columns() {
        let conn = fresh_conn();
        assert!(!column_exists(&conn, "tasks", "client_id").unwrap());

        migrate_sync_columns(&conn).unwrap();

        for (table, column) in [
            ("tasks", "client_id"),
            ("tasks", "server_id"),
            ("tasks", "version"),
            ("todo_lists", "client_id"),
            ("todo_lists", "server_id"),
            ("todo_lists", "version"),
        ] {
            assert!(
                column_exists(&conn, table, column).unwrap(),
                "{table}.{column} missing after migration"
            );
        }
    }

    #[test]
    fn migration_is_idempotent() {
        let conn = fresh_conn();
        migrate_sync_columns(&conn).unwrap();
        migrate_sync_columns(&conn).unwrap();
    }

    #[test]
    fn orphan_repair_reassigns_to_default_list() {
        let conn = fresh_conn();
        migrate_sync_columns(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO todo_lists (name) VALUES ('General');
             INSERT INTO tasks (todo, list_id) VALUES ('orphan', 0);
             INSERT INTO tasks (todo, list_id) VALUES ('ok', 1);",
        )
        .unwrap();

        let repaired = repair_orphaned_tasks(&conn).unwrap();
        assert_eq!(repaired, 1);
        assert_eq!(count_orphaned_tasks(&conn).unwrap(), 0);

        let list_id: i64 = conn
            .query_row(
                "SELECT list_id FROM tasks WHERE todo = 'orphan'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(list_id, DEFAULT_LIST_ID);
    }
}
