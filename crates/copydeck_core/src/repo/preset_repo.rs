//! Style preset repository contracts and SQLite implementation.

use crate::codec::{decode_or_default, encode_field};
use crate::db::DbError;
use crate::model::preset::{NewStylePreset, PresetId, StylePreset, StylePresetPatch};
use crate::model::user::UserId;
use crate::repo::error::{conflict_on_unique, RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, parse_uuid, Assignments};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PRESET_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    name,
    description,
    character_limits,
    style_rules,
    brand_keywords,
    forbidden_words,
    created_at,
    updated_at
FROM style_presets";

/// Repository interface for style presets.
pub trait StylePresetRepository {
    fn create_preset(&self, user_id: UserId, preset: &NewStylePreset) -> RepoResult<PresetId>;
    fn get_preset(&self, id: PresetId) -> RepoResult<Option<StylePreset>>;
    fn preset_owner(&self, id: PresetId) -> RepoResult<Option<UserId>>;
    /// Lists a user's presets ordered by name.
    fn list_presets_for_user(&self, user_id: UserId) -> RepoResult<Vec<StylePreset>>;
    fn update_preset(&self, id: PresetId, patch: &StylePresetPatch) -> RepoResult<()>;
    fn delete_preset(&self, id: PresetId) -> RepoResult<()>;
}

/// SQLite-backed style preset repository.
pub struct SqliteStylePresetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStylePresetRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "style_presets",
                &[
                    "id",
                    "user_id",
                    "name",
                    "character_limits",
                    "style_rules",
                    "brand_keywords",
                    "forbidden_words",
                ],
            )],
        )?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StylePresetRepository for SqliteStylePresetRepository<'_> {
    fn create_preset(&self, user_id: UserId, preset: &NewStylePreset) -> RepoResult<PresetId> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO style_presets (
                    id,
                    user_id,
                    name,
                    description,
                    character_limits,
                    style_rules,
                    brand_keywords,
                    forbidden_words
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    id.to_string(),
                    user_id.to_string(),
                    preset.name.trim(),
                    preset.description.as_deref(),
                    encode_field(&preset.character_limits)?,
                    encode_field(&preset.style_rules)?,
                    encode_field(&preset.brand_keywords)?,
                    encode_field(&preset.forbidden_words)?,
                ],
            )
            .map_err(|err| {
                conflict_on_unique(err, format!("preset name `{}` already exists", preset.name))
            })?;
        Ok(id)
    }

    fn get_preset(&self, id: PresetId) -> RepoResult<Option<StylePreset>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRESET_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_preset_row(row)?)),
            None => Ok(None),
        }
    }

    fn preset_owner(&self, id: PresetId) -> RepoResult<Option<UserId>> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT user_id FROM style_presets WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        owner
            .map(|value| parse_uuid(&value, "style_presets.user_id"))
            .transpose()
    }

    fn list_presets_for_user(&self, user_id: UserId) -> RepoResult<Vec<StylePreset>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PRESET_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut presets = Vec::new();
        while let Some(row) = rows.next()? {
            presets.push(parse_preset_row(row)?);
        }
        Ok(presets)
    }

    fn update_preset(&self, id: PresetId, patch: &StylePresetPatch) -> RepoResult<()> {
        let mut assignments = Assignments::new();
        if let Some(name) = patch.name.as_deref() {
            assignments.set_text("name", Some(name.trim()));
        }
        if let Some(description) = patch.description.as_ref() {
            assignments.set_text("description", description.as_deref());
        }
        if let Some(limits) = patch.character_limits.as_ref() {
            assignments.set_text("character_limits", Some(encode_field(limits)?.as_str()));
        }
        if let Some(rules) = patch.style_rules.as_ref() {
            assignments.set_text("style_rules", Some(encode_field(rules)?.as_str()));
        }
        if let Some(keywords) = patch.brand_keywords.as_ref() {
            assignments.set_text("brand_keywords", Some(encode_field(keywords)?.as_str()));
        }
        if let Some(words) = patch.forbidden_words.as_ref() {
            assignments.set_text("forbidden_words", Some(encode_field(words)?.as_str()));
        }

        let changed = assignments
            .execute(self.conn, "style_presets", id)
            .map_err(|err| match err {
                RepoError::Db(DbError::Sqlite(sqlite_err)) => {
                    conflict_on_unique(sqlite_err, "preset name already exists")
                }
                other => other,
            })?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "style preset",
                id,
            });
        }
        Ok(())
    }

    fn delete_preset(&self, id: PresetId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM style_presets WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "style preset",
                id,
            });
        }
        Ok(())
    }
}

fn parse_preset_row(row: &Row<'_>) -> RepoResult<StylePreset> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let limits: Option<String> = row.get("character_limits")?;
    let rules: Option<String> = row.get("style_rules")?;
    let keywords: Option<String> = row.get("brand_keywords")?;
    let forbidden: Option<String> = row.get("forbidden_words")?;

    Ok(StylePreset {
        id: parse_uuid(&id_text, "style_presets.id")?,
        user_id: parse_uuid(&user_text, "style_presets.user_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        character_limits: decode_or_default(limits.as_deref()),
        style_rules: decode_or_default(rules.as_deref()),
        brand_keywords: decode_or_default(keywords.as_deref()),
        forbidden_words: decode_or_default(forbidden.as_deref()),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
