//! Copy entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `copy_entries`, joined with project name/client.
//! - Own the list query (filters, allow-listed ordering, pagination).
//! - Expose raw public rows for the timeline without decoding them.
//!
//! # Invariants
//! - Structured columns are decoded fail-soft: a malformed value reads as
//!   absent and never fails the row.
//! - Sort columns come from [`EntrySortField`], never from caller text.
//! - Duplicate and restore copy structured columns as stored text, so a
//!   value this build cannot decode is still carried over verbatim.

use crate::codec::{decode_field, decode_or_default, encode_field, encode_optional};
use crate::model::entry::{
    CopyEntry, CopyEntryPatch, EntryId, EntryStatus, NewCopyEntry,
};
use crate::model::history::HistoryId;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_optional_uuid, parse_uuid,
    text_value, Assignments, NOW_MS_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const ENTRIES_DEFAULT_LIMIT: u32 = 20;
const ENTRIES_LIMIT_MAX: u32 = 100;

const ENTRY_SELECT_SQL: &str = "SELECT
    e.id AS id,
    e.project_id AS project_id,
    e.user_id AS user_id,
    e.user_name AS user_name,
    e.title AS title,
    e.original_text AS original_text,
    e.version_90 AS version_90,
    e.version_180 AS version_180,
    e.version_700 AS version_700,
    e.custom_versions AS custom_versions,
    e.custom_limits AS custom_limits,
    e.style_preset AS style_preset,
    e.status AS status,
    e.tags AS tags,
    e.is_public AS is_public,
    e.created_at AS created_at,
    e.updated_at AS updated_at,
    p.name AS project_name,
    p.client_name AS client_name
FROM copy_entries e
LEFT JOIN projects p ON p.id = e.project_id";

/// Sortable entry columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntrySortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Status,
}

impl EntrySortField {
    /// Parses caller text (`created_at` or `createdAt` style).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "created_at" | "createdAt" => Ok(Self::CreatedAt),
            "updated_at" | "updatedAt" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            other => Err(ValidationError::UnsupportedSortField(other.to_string())),
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "e.created_at",
            Self::UpdatedAt => "e.updated_at",
            Self::Title => "e.title COLLATE NOCASE",
            Self::Status => "e.status",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ValidationError::UnsupportedSortOrder(value.to_string())),
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query options for listing a project's entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryListQuery {
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
    pub sort_by: EntrySortField,
    pub sort_order: SortOrder,
    /// Exact status match.
    pub status: Option<EntryStatus>,
    /// Case-insensitive substring match against title or original text.
    pub search_text: Option<String>,
}

/// Normalizes list limit according to the listing contract.
pub fn normalize_entry_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => ENTRIES_DEFAULT_LIMIT,
        Some(value) if value > ENTRIES_LIMIT_MAX => ENTRIES_LIMIT_MAX,
        Some(value) => value,
    }
}

/// Access-relevant facts about one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOwnership {
    pub project_id: Option<ProjectId>,
    /// Owner of the parent project; `None` for project-less entries.
    pub owner_id: Option<UserId>,
}

/// Undecoded public entry row joined with its author's profile.
///
/// Structured columns stay raw text so the timeline can degrade per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicEntryRow {
    pub id: EntryId,
    pub title: Option<String>,
    pub original_text: String,
    pub user_name: Option<String>,
    pub version_90: Option<String>,
    pub version_180: Option<String>,
    pub version_700: Option<String>,
    pub custom_versions: Option<String>,
    pub custom_limits: Option<String>,
    pub style_preset: Option<String>,
    pub created_at: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Repository interface for copy entries.
pub trait CopyEntryRepository {
    fn insert_entry(
        &self,
        project_id: Option<ProjectId>,
        user_id: Option<UserId>,
        fields: &NewCopyEntry,
    ) -> RepoResult<EntryId>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<CopyEntry>>;
    fn entry_ownership(&self, id: EntryId) -> RepoResult<Option<EntryOwnership>>;
    fn list_entries_for_project(
        &self,
        project_id: ProjectId,
        query: &EntryListQuery,
    ) -> RepoResult<Vec<CopyEntry>>;
    /// Applies a partial update; omitted fields keep their stored values.
    fn update_entry(&self, id: EntryId, patch: &CopyEntryPatch) -> RepoResult<()>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
    /// Copies text, version and tag columns of `source_id` into a new entry.
    fn duplicate_entry(
        &self,
        source_id: EntryId,
        project_id: Option<ProjectId>,
        user_id: UserId,
        title: &str,
    ) -> RepoResult<EntryId>;
    /// Writes a history row's versioned fields back onto its entry.
    fn restore_from_history(&self, id: EntryId, history_id: HistoryId) -> RepoResult<()>;
    /// Most recently created public rows first.
    fn list_public_rows(&self, limit: u32) -> RepoResult<Vec<PublicEntryRow>>;
}

/// SQLite-backed copy entry repository.
pub struct SqliteCopyEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCopyEntryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                (
                    "copy_entries",
                    &[
                        "id",
                        "project_id",
                        "user_id",
                        "original_text",
                        "version_90",
                        "version_180",
                        "version_700",
                        "custom_versions",
                        "custom_limits",
                        "status",
                        "tags",
                        "is_public",
                    ],
                ),
                ("projects", &["id", "user_id", "name", "client_name"]),
            ],
        )?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CopyEntryRepository for SqliteCopyEntryRepository<'_> {
    fn insert_entry(
        &self,
        project_id: Option<ProjectId>,
        user_id: Option<UserId>,
        fields: &NewCopyEntry,
    ) -> RepoResult<EntryId> {
        let id = Uuid::new_v4();
        let tags = if fields.tags.is_empty() {
            None
        } else {
            Some(encode_field(&fields.tags)?)
        };

        self.conn.execute(
            "INSERT INTO copy_entries (
                id,
                project_id,
                user_id,
                user_name,
                title,
                original_text,
                version_90,
                version_180,
                version_700,
                custom_versions,
                custom_limits,
                style_preset,
                status,
                tags,
                is_public
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                id.to_string(),
                project_id.map(|value| value.to_string()),
                user_id.map(|value| value.to_string()),
                fields.user_name.as_deref(),
                fields.title.as_deref(),
                fields.original_text.as_str(),
                fields.version_90.as_deref(),
                fields.version_180.as_deref(),
                fields.version_700.as_deref(),
                encode_optional(fields.custom_versions.as_ref())?,
                encode_optional(fields.custom_limits.as_ref())?,
                fields.style_preset.as_deref(),
                fields.status.unwrap_or_default().as_str(),
                tags,
                bool_to_int(fields.is_public.unwrap_or(true)),
            ],
        )?;

        Ok(id)
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<CopyEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE e.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_entry_row(row)?)),
            None => Ok(None),
        }
    }

    fn entry_ownership(&self, id: EntryId) -> RepoResult<Option<EntryOwnership>> {
        let found: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT e.project_id, p.user_id
                 FROM copy_entries e
                 LEFT JOIN projects p ON p.id = e.project_id
                 WHERE e.id = ?1;",
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((project_id, owner_id)) = found else {
            return Ok(None);
        };
        Ok(Some(EntryOwnership {
            project_id: parse_optional_uuid(project_id, "copy_entries.project_id")?,
            owner_id: parse_optional_uuid(owner_id, "projects.user_id")?,
        }))
    }

    fn list_entries_for_project(
        &self,
        project_id: ProjectId,
        query: &EntryListQuery,
    ) -> RepoResult<Vec<CopyEntry>> {
        let mut sql = format!("{ENTRY_SELECT_SQL} WHERE e.project_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(project_id.to_string())];

        if let Some(status) = query.status {
            sql.push_str(" AND e.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(search) = query
            .search_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            sql.push_str(
                " AND (
                    instr(fold_case(coalesce(e.title, '')), fold_case(?)) > 0
                    OR instr(fold_case(e.original_text), fold_case(?)) > 0
                )",
            );
            bind_values.push(Value::Text(search.to_string()));
            bind_values.push(Value::Text(search.to_string()));
        }

        let direction = query.sort_order.keyword();
        sql.push_str(&format!(
            " ORDER BY {} {direction}, e.rowid {direction}",
            query.sort_by.column()
        ));

        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_entry_limit(query.limit))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn update_entry(&self, id: EntryId, patch: &CopyEntryPatch) -> RepoResult<()> {
        let mut assignments = Assignments::new();
        if let Some(title) = patch.title.as_ref() {
            assignments.set_text("title", title.as_deref());
        }
        if let Some(text) = patch.original_text.as_deref() {
            assignments.set_text("original_text", Some(text));
        }
        if let Some(value) = patch.version_90.as_ref() {
            assignments.set_text("version_90", value.as_deref());
        }
        if let Some(value) = patch.version_180.as_ref() {
            assignments.set_text("version_180", value.as_deref());
        }
        if let Some(value) = patch.version_700.as_ref() {
            assignments.set_text("version_700", value.as_deref());
        }
        if let Some(versions) = patch.custom_versions.as_ref() {
            let encoded = encode_optional(versions.as_ref())?;
            assignments.set_text("custom_versions", encoded.as_deref());
        }
        if let Some(limits) = patch.custom_limits.as_ref() {
            let encoded = encode_optional(limits.as_ref())?;
            assignments.set_text("custom_limits", encoded.as_deref());
        }
        if let Some(preset) = patch.style_preset.as_ref() {
            assignments.set_text("style_preset", preset.as_deref());
        }
        if let Some(status) = patch.status {
            assignments.set_text("status", Some(status.as_str()));
        }
        if let Some(tags) = patch.tags.as_ref() {
            let encoded = if tags.is_empty() {
                None
            } else {
                Some(encode_field(tags)?)
            };
            assignments.set("tags", text_value(encoded.as_deref()));
        }
        if let Some(is_public) = patch.is_public {
            assignments.set("is_public", Value::Integer(bool_to_int(is_public)));
        }

        let changed = assignments.execute(self.conn, "copy_entries", id)?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "copy entry",
                id,
            });
        }
        Ok(())
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM copy_entries WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "copy entry",
                id,
            });
        }
        Ok(())
    }

    fn duplicate_entry(
        &self,
        source_id: EntryId,
        project_id: Option<ProjectId>,
        user_id: UserId,
        title: &str,
    ) -> RepoResult<EntryId> {
        let id = Uuid::new_v4();
        let changed = self.conn.execute(
            "INSERT INTO copy_entries (
                id,
                project_id,
                user_id,
                title,
                original_text,
                version_90,
                version_180,
                version_700,
                custom_versions,
                custom_limits,
                style_preset,
                tags,
                is_public
            )
            SELECT
                ?1,
                ?2,
                ?3,
                ?4,
                original_text,
                version_90,
                version_180,
                version_700,
                custom_versions,
                custom_limits,
                style_preset,
                tags,
                is_public
            FROM copy_entries
            WHERE id = ?5;",
            params![
                id.to_string(),
                project_id.map(|value| value.to_string()),
                user_id.to_string(),
                title,
                source_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "copy entry",
                id: source_id,
            });
        }
        Ok(id)
    }

    fn restore_from_history(&self, id: EntryId, history_id: HistoryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE copy_entries
                 SET
                    original_text = h.original_text,
                    version_90 = h.version_90,
                    version_180 = h.version_180,
                    version_700 = h.version_700,
                    custom_versions = h.custom_versions,
                    status = h.status,
                    tags = h.tags,
                    updated_at = {NOW_MS_SQL}
                 FROM version_history AS h
                 WHERE h.id = ?2
                   AND h.copy_entry_id = copy_entries.id
                   AND copy_entries.id = ?1;"
            ),
            params![id.to_string(), history_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "version history",
                id: history_id,
            });
        }
        Ok(())
    }

    fn list_public_rows(&self, limit: u32) -> RepoResult<Vec<PublicEntryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                e.id AS id,
                e.title AS title,
                e.original_text AS original_text,
                e.user_name AS user_name,
                e.version_90 AS version_90,
                e.version_180 AS version_180,
                e.version_700 AS version_700,
                e.custom_versions AS custom_versions,
                e.custom_limits AS custom_limits,
                e.style_preset AS style_preset,
                e.created_at AS created_at,
                u.first_name AS first_name,
                u.last_name AS last_name,
                u.email AS email
             FROM copy_entries e
             LEFT JOIN users u ON u.id = e.user_id
             WHERE e.is_public = 1
             ORDER BY e.created_at DESC, e.rowid DESC
             LIMIT ?1;",
        )?;

        let mut rows = stmt.query([i64::from(limit)])?;
        let mut public_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            public_rows.push(PublicEntryRow {
                id: parse_uuid(&id_text, "copy_entries.id")?,
                title: row.get("title")?,
                original_text: row.get("original_text")?,
                user_name: row.get("user_name")?,
                version_90: row.get("version_90")?,
                version_180: row.get("version_180")?,
                version_700: row.get("version_700")?,
                custom_versions: row.get("custom_versions")?,
                custom_limits: row.get("custom_limits")?,
                style_preset: row.get("style_preset")?,
                created_at: row.get("created_at")?,
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
                email: row.get("email")?,
            });
        }
        Ok(public_rows)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<CopyEntry> {
    let id_text: String = row.get("id")?;
    let status_text: String = row.get("status")?;
    let status = EntryStatus::parse(&status_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in copy_entries.status"
        ))
    })?;
    let custom_versions: Option<String> = row.get("custom_versions")?;
    let custom_limits: Option<String> = row.get("custom_limits")?;
    let tags: Option<String> = row.get("tags")?;

    Ok(CopyEntry {
        id: parse_uuid(&id_text, "copy_entries.id")?,
        project_id: parse_optional_uuid(row.get("project_id")?, "copy_entries.project_id")?,
        user_id: parse_optional_uuid(row.get("user_id")?, "copy_entries.user_id")?,
        user_name: row.get("user_name")?,
        title: row.get("title")?,
        original_text: row.get("original_text")?,
        version_90: row.get("version_90")?,
        version_180: row.get("version_180")?,
        version_700: row.get("version_700")?,
        custom_versions: decode_field(custom_versions.as_deref()).into_option(),
        custom_limits: decode_field(custom_limits.as_deref()).into_option(),
        style_preset: row.get("style_preset")?,
        status,
        tags: decode_or_default(tags.as_deref()),
        is_public: int_to_bool(row.get("is_public")?, "copy_entries.is_public")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        project_name: row.get("project_name")?,
        client_name: row.get("client_name")?,
    })
}
