//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Email uniqueness is case-insensitive and enforced by the store.
//! - Users are never hard-deleted through this repository.

use crate::model::user::{NewUser, User, UserId, UserProfilePatch};
use crate::repo::error::{conflict_on_unique, RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, parse_uuid, Assignments};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    first_name,
    last_name,
    created_at,
    updated_at
FROM users";

/// Repository interface for user identity records.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn update_profile(&self, id: UserId, patch: &UserProfilePatch) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[("users", &["id", "email", "first_name", "last_name"])],
        )?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO users (id, email, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    id.to_string(),
                    user.email.trim(),
                    user.first_name.as_deref(),
                    user.last_name.as_deref(),
                ],
            )
            .map_err(|err| conflict_on_unique(err, "email already in use"))?;
        Ok(id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"))?;
        let mut rows = stmt.query([email.trim()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_profile(&self, id: UserId, patch: &UserProfilePatch) -> RepoResult<()> {
        let mut assignments = Assignments::new();
        if let Some(first_name) = patch.first_name.as_ref() {
            assignments.set_text("first_name", first_name.as_deref());
        }
        if let Some(last_name) = patch.last_name.as_ref() {
            assignments.set_text("last_name", last_name.as_deref());
        }

        let changed = assignments.execute(self.conn, "users", id)?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
