//! Change-log entry types.

/// The kind of entity a change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A task row.
    Task,
    /// A todo-list row.
    List,
}

impl EntityKind {
    /// Returns the storage string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::List => "list",
        }
    }

    /// Parses a storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "task" => Some(EntityKind::Task),
            "list" => Some(EntityKind::List),
            _ => None,
        }
    }
}

/// The kind of mutation a change records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Entity was created.
    Create,
    /// Entity was updated (includes archive/unarchive).
    Update,
    /// Entity was soft-deleted.
    Delete,
}

impl ChangeKind {
    /// Returns the storage string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }

    /// Parses a storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(ChangeKind::Create),
            "update" => Some(ChangeKind::Update),
            "delete" => Some(ChangeKind::Delete),
            _ => None,
        }
    }
}

/// An append-only record of one local mutation awaiting propagation.
///
/// Entries are created by every mutating store operation and flagged
/// `synced` after a successful push. They are never otherwise updated and
/// never deleted; the log doubles as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Log row id.
    pub id: i64,
    /// Entity kind this change refers to.
    pub entity: EntityKind,
    /// Local row id of the changed entity.
    pub entity_id: i64,
    /// What happened.
    pub kind: ChangeKind,
    /// When the mutation was recorded.
    pub timestamp: i64,
    /// Whether a successful push has covered this entry.
    pub synced: bool,
}
