//! # ticklist model
//!
//! Domain types and validation for ticklist.
//!
//! This crate provides:
//! - Task and todo-list records shared by the store and sync layers
//! - Change-log entry types (entity kind, change kind)
//! - Field validation (list names, task text, priority clamping)
//! - Due-date string parsing
//! - Client identifier generation
//!
//! Everything here is pure data and pure functions; persistence and
//! network concerns live in `ticklist_store` and `ticklist_sync`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change;
mod duedate;
mod error;
mod ids;
mod list;
mod task;
mod validate;

pub use change::{Change, ChangeKind, EntityKind};
pub use duedate::parse_due_date;
pub use error::{ModelError, ModelResult};
pub use ids::generate_client_id;
pub use list::TodoList;
pub use task::Task;
pub use validate::{clamp_priority, validate_list_name, validate_task_text};

/// Highest task priority.
pub const PRIORITY_HIGH: u8 = 1;
/// Lowest task priority.
pub const PRIORITY_LOW: u8 = 4;
/// Priority assigned when none is given or the stored value is invalid.
pub const DEFAULT_PRIORITY: u8 = 3;

/// Maximum list name length after trimming, in characters.
pub const MAX_LIST_NAME_LEN: usize = 100;

/// Largest accepted "due in N days" offset (100 years).
pub const MAX_DAYS_OFFSET: i64 = 36500;

/// Name of the list created when a database has none.
pub const DEFAULT_LIST_NAME: &str = "General";

/// Local row id of the default list tasks are repaired onto.
pub const DEFAULT_LIST_ID: i64 = 1;

/// Returns the current unix time in seconds.
pub fn unix_now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
