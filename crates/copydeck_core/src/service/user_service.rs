//! User record service for the storage side of the identity subsystem.
//!
//! Credentials never pass through here; callers resolve a principal with an
//! [`crate::auth::Authenticator`] and then act as that `UserId`.

use crate::error::{CoreError, CoreResult};
use crate::model::user::{NewUser, User, UserId, UserProfilePatch};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::logged;
use rusqlite::Connection;

pub struct UserService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> UserService<'conn> {
    /// Creates a service from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> CoreResult<Self> {
        SqliteUserRepository::try_new(conn)?;
        Ok(Self { conn })
    }

    /// Stores a new user; an email already in use is a conflict.
    pub fn register_user(&self, user: NewUser) -> CoreResult<User> {
        user.validate()?;
        logged("user_register", || {
            let repo = SqliteUserRepository::new(self.conn);
            let user_id = repo.create_user(&user)?;
            read_back(&repo, user_id)
        })
    }

    pub fn get_user(&self, user_id: UserId) -> CoreResult<User> {
        read_back(&SqliteUserRepository::new(self.conn), user_id)
    }

    pub fn find_by_email(&self, email: &str) -> CoreResult<User> {
        SqliteUserRepository::new(self.conn)
            .find_user_by_email(email)?
            .ok_or(CoreError::NotFoundOrDenied)
    }

    /// Merges profile name parts; omitted parts keep their values.
    pub fn update_profile(&self, user_id: UserId, patch: UserProfilePatch) -> CoreResult<User> {
        logged("user_update_profile", || {
            let repo = SqliteUserRepository::new(self.conn);
            repo.update_profile(user_id, &patch)?;
            read_back(&repo, user_id)
        })
    }
}

fn read_back(repo: &SqliteUserRepository<'_>, user_id: UserId) -> CoreResult<User> {
    repo.get_user(user_id)?.ok_or(CoreError::NotFoundOrDenied)
}
