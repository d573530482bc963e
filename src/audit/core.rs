//! Audit log storage.
//!
//! Every mutation of the user's data records an entry so the month page can
//! show a history of changes. Entries are filtered by time range in SQL.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::DatabaseId};

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// The entity was created.
    Created,
    /// The entity was updated.
    Updated,
    /// The entity was deleted.
    Deleted,
}

impl AuditAction {
    /// The identifier stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Deleted => "deleted",
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A transaction row.
    Transaction,
    /// A category row.
    Category,
    /// A card row.
    Card,
    /// A monthly goal row.
    Goal,
    /// A month's settings row.
    MonthlySettings,
}

impl EntityKind {
    /// The identifier stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "transaction",
            EntityKind::Category => "category",
            EntityKind::Card => "card",
            EntityKind::Goal => "goal",
            EntityKind::MonthlySettings => "monthly_settings",
        }
    }

    /// The human readable name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "Transaction",
            EntityKind::Category => "Category",
            EntityKind::Card => "Card",
            EntityKind::Goal => "Goal",
            EntityKind::MonthlySettings => "Month settings",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    /// The ID of the audit entry.
    pub id: DatabaseId,
    /// The user whose data changed.
    pub user_id: UserID,
    /// What happened.
    pub action: String,
    /// The kind of entity that changed.
    pub entity_kind: String,
    /// The ID of the entity that changed.
    pub entity_id: DatabaseId,
    /// When the change happened (UTC).
    pub changed_at: OffsetDateTime,
}

/// Create the audit log table and indexes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_audit_log_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            action TEXT NOT NULL,
            entity_kind TEXT NOT NULL,
            entity_id INTEGER NOT NULL,
            changed_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_audit_log_user_changed_at
            ON audit_log(user_id, changed_at);",
    )?;

    Ok(())
}

/// Record an audit entry for a data change.
///
/// Failures are logged and swallowed: the audit log is a convenience and must
/// never fail the mutation it describes.
pub fn record_audit_event(
    user_id: UserID,
    action: AuditAction,
    entity_kind: EntityKind,
    entity_id: DatabaseId,
    connection: &Connection,
) {
    let result = connection.execute(
        "INSERT INTO audit_log (user_id, action, entity_kind, entity_id, changed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            action.as_str(),
            entity_kind.as_str(),
            entity_id,
            OffsetDateTime::now_utc(),
        ),
    );

    if let Err(error) = result {
        tracing::warn!(
            "could not record audit entry ({action} {entity_kind} {entity_id}): {error}"
        );
    }
}

/// Get a user's audit entries with `changed_at` in `[start, end)`, newest first.
pub fn get_audit_log_for_range(
    user_id: UserID,
    start: OffsetDateTime,
    end: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<AuditEntry>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, action, entity_kind, entity_id, changed_at FROM audit_log
             WHERE user_id = ?1 AND changed_at >= ?2 AND changed_at < ?3
             ORDER BY changed_at DESC",
        )?
        .query_map((user_id.as_i64(), start, end), map_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<AuditEntry, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let action = row.get(2)?;
    let entity_kind = row.get(3)?;
    let entity_id = row.get(4)?;
    let changed_at = row.get(5)?;

    Ok(AuditEntry {
        id,
        user_id: UserID::new(raw_user_id),
        action,
        entity_kind,
        entity_id,
        changed_at,
    })
}
