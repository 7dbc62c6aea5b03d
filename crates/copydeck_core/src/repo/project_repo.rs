//! Project repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a project cascades to its entries (and their history) through
//!   foreign keys; this repository issues a single DELETE.
//! - Partial updates only touch supplied columns.

use crate::model::project::{
    NewProject, OrganizationType, Project, ProjectId, ProjectPatch, ProjectSummary,
};
use crate::model::user::UserId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, parse_uuid, Assignments};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "p.id AS id,
    p.user_id AS user_id,
    p.name AS name,
    p.description AS description,
    p.client_name AS client_name,
    p.brand_guidelines AS brand_guidelines,
    p.organization_type AS organization_type,
    p.organization_value AS organization_value,
    p.created_at AS created_at,
    p.updated_at AS updated_at";

/// Repository interface for projects.
pub trait ProjectRepository {
    fn create_project(&self, user_id: UserId, project: &NewProject) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Returns the owning user of a project, if the project exists.
    fn project_owner(&self, id: ProjectId) -> RepoResult<Option<UserId>>;
    /// Lists a user's projects newest first, with entry counts.
    fn list_projects_for_user(&self, user_id: UserId) -> RepoResult<Vec<ProjectSummary>>;
    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "projects",
                &[
                    "id",
                    "user_id",
                    "name",
                    "client_name",
                    "organization_type",
                    "organization_value",
                ],
            )],
        )?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, user_id: UserId, project: &NewProject) -> RepoResult<ProjectId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO projects (
                id,
                user_id,
                name,
                description,
                client_name,
                brand_guidelines,
                organization_type,
                organization_value
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                user_id.to_string(),
                project.name.trim(),
                project.description.as_deref(),
                project.client_name.as_deref(),
                project.brand_guidelines.as_deref(),
                project.organization_type.as_str(),
                project.organization_value.as_deref(),
            ],
        )?;
        Ok(id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }

    fn project_owner(&self, id: ProjectId) -> RepoResult<Option<UserId>> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT user_id FROM projects WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        owner
            .map(|value| parse_uuid(&value, "projects.user_id"))
            .transpose()
    }

    fn list_projects_for_user(&self, user_id: UserId) -> RepoResult<Vec<ProjectSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {PROJECT_COLUMNS},
                (SELECT COUNT(*) FROM copy_entries e WHERE e.project_id = p.id) AS entry_count
             FROM projects p
             WHERE p.user_id = ?1
             ORDER BY p.created_at DESC, p.rowid DESC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(ProjectSummary {
                project: parse_project_row(row)?,
                entry_count: row.get("entry_count")?,
            });
        }
        Ok(projects)
    }

    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<()> {
        let mut assignments = Assignments::new();
        if let Some(name) = patch.name.as_deref() {
            assignments.set_text("name", Some(name.trim()));
        }
        if let Some(description) = patch.description.as_ref() {
            assignments.set_text("description", description.as_deref());
        }
        if let Some(client_name) = patch.client_name.as_ref() {
            assignments.set_text("client_name", client_name.as_deref());
        }
        if let Some(guidelines) = patch.brand_guidelines.as_ref() {
            assignments.set_text("brand_guidelines", guidelines.as_deref());
        }
        if let Some(kind) = patch.organization_type {
            assignments.set(
                "organization_type",
                Value::Text(kind.as_str().to_string()),
            );
        }
        if let Some(value) = patch.organization_value.as_ref() {
            assignments.set_text("organization_value", value.as_deref());
        }

        let changed = assignments.execute(self.conn, "projects", id)?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let kind_text: String = row.get("organization_type")?;
    let organization_type = OrganizationType::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid organization type `{kind_text}` in projects.organization_type"
        ))
    })?;

    Ok(Project {
        id: parse_uuid(&id_text, "projects.id")?,
        user_id: parse_uuid(&user_text, "projects.user_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        client_name: row.get("client_name")?,
        brand_guidelines: row.get("brand_guidelines")?,
        organization_type,
        organization_value: row.get("organization_value")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
