//! Version history repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Snapshots are copied column-for-column from the current entry row in a
//!   single `INSERT ... SELECT`, so they always reflect stored state.
//! - History rows are never updated; they are removed only by cascade.
//! - Listing order is newest first, ties broken by insertion order.

use crate::codec::{decode_field, decode_or_default};
use crate::model::entry::{EntryId, EntryStatus};
use crate::model::history::{HistoryId, VersionHistoryRecord, VersionSnapshot};
use crate::model::user::{display_name_from_parts, UserId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, parse_optional_uuid, parse_uuid};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const HISTORY_SELECT_SQL: &str = "SELECT
    h.id AS id,
    h.copy_entry_id AS copy_entry_id,
    h.user_id AS user_id,
    h.original_text AS original_text,
    h.version_90 AS version_90,
    h.version_180 AS version_180,
    h.version_700 AS version_700,
    h.custom_versions AS custom_versions,
    h.status AS status,
    h.tags AS tags,
    h.comment AS comment,
    h.created_at AS created_at,
    u.first_name AS first_name,
    u.last_name AS last_name,
    u.email AS email
FROM version_history h
LEFT JOIN users u ON u.id = h.user_id";

/// Repository interface for entry version history.
pub trait HistoryRepository {
    /// Appends a snapshot of the entry's current versioned fields.
    fn snapshot_entry(
        &self,
        entry_id: EntryId,
        user_id: UserId,
        comment: Option<&str>,
    ) -> RepoResult<HistoryId>;
    fn get_history_record(&self, id: HistoryId) -> RepoResult<Option<VersionHistoryRecord>>;
    fn list_history(&self, entry_id: EntryId) -> RepoResult<Vec<VersionHistoryRecord>>;
}

/// SQLite-backed version history repository.
pub struct SqliteHistoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHistoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "version_history",
                &[
                    "id",
                    "copy_entry_id",
                    "user_id",
                    "original_text",
                    "custom_versions",
                    "status",
                    "tags",
                    "comment",
                ],
            )],
        )?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl HistoryRepository for SqliteHistoryRepository<'_> {
    fn snapshot_entry(
        &self,
        entry_id: EntryId,
        user_id: UserId,
        comment: Option<&str>,
    ) -> RepoResult<HistoryId> {
        let id = Uuid::new_v4();
        let changed = self.conn.execute(
            "INSERT INTO version_history (
                id,
                copy_entry_id,
                user_id,
                original_text,
                version_90,
                version_180,
                version_700,
                custom_versions,
                status,
                tags,
                comment
            )
            SELECT
                ?1,
                id,
                ?2,
                original_text,
                version_90,
                version_180,
                version_700,
                custom_versions,
                status,
                tags,
                ?3
            FROM copy_entries
            WHERE id = ?4;",
            params![
                id.to_string(),
                user_id.to_string(),
                comment,
                entry_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "copy entry",
                id: entry_id,
            });
        }
        Ok(id)
    }

    fn get_history_record(&self, id: HistoryId) -> RepoResult<Option<VersionHistoryRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HISTORY_SELECT_SQL} WHERE h.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_history_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_history(&self, entry_id: EntryId) -> RepoResult<Vec<VersionHistoryRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HISTORY_SELECT_SQL}
             WHERE h.copy_entry_id = ?1
             ORDER BY h.created_at DESC, h.rowid DESC;"
        ))?;
        let mut rows = stmt.query([entry_id.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_history_row(row)?);
        }
        Ok(records)
    }
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<VersionHistoryRecord> {
    let id_text: String = row.get("id")?;
    let entry_text: String = row.get("copy_entry_id")?;
    let status_text: String = row.get("status")?;
    let status = EntryStatus::parse(&status_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in version_history.status"
        ))
    })?;
    let custom_versions: Option<String> = row.get("custom_versions")?;
    let tags: Option<String> = row.get("tags")?;
    let first_name: Option<String> = row.get("first_name")?;
    let last_name: Option<String> = row.get("last_name")?;
    let email: Option<String> = row.get("email")?;

    Ok(VersionHistoryRecord {
        id: parse_uuid(&id_text, "version_history.id")?,
        copy_entry_id: parse_uuid(&entry_text, "version_history.copy_entry_id")?,
        user_id: parse_optional_uuid(row.get("user_id")?, "version_history.user_id")?,
        user_display_name: display_name_from_parts(
            first_name.as_deref(),
            last_name.as_deref(),
            email.as_deref(),
        ),
        snapshot: VersionSnapshot {
            original_text: row.get("original_text")?,
            version_90: row.get("version_90")?,
            version_180: row.get("version_180")?,
            version_700: row.get("version_700")?,
            custom_versions: decode_field(custom_versions.as_deref()).into_option(),
            status,
            tags: decode_or_default(tags.as_deref()),
        },
        comment: row.get("comment")?,
        created_at: row.get("created_at")?,
    })
}
