//! Project use-case service.
//!
//! # Invariants
//! - Reads and writes of a project require the guard to pass first.
//! - Updates are partial merges; deletes cascade to entries and history.

use crate::error::{CoreError, CoreResult};
use crate::guard::OwnershipGuard;
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch, ProjectSummary};
use crate::model::user::UserId;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::service::logged;
use rusqlite::{Connection, TransactionBehavior};

pub struct ProjectService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> ProjectService<'conn> {
    /// Creates a service from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> CoreResult<Self> {
        SqliteProjectRepository::try_new(conn)?;
        Ok(Self { conn })
    }

    pub fn create_project(&self, user_id: UserId, project: NewProject) -> CoreResult<Project> {
        project.validate()?;
        logged("project_create", || {
            let repo = SqliteProjectRepository::new(self.conn);
            let project_id = repo.create_project(user_id, &project)?;
            read_back(&repo, project_id)
        })
    }

    pub fn get_project(&self, project_id: ProjectId, user_id: UserId) -> CoreResult<Project> {
        OwnershipGuard::new(self.conn).authorize(user_id, project_id)?;
        read_back(&SqliteProjectRepository::new(self.conn), project_id)
    }

    /// Lists the user's projects newest first, with entry counts.
    pub fn list_projects(&self, user_id: UserId) -> CoreResult<Vec<ProjectSummary>> {
        Ok(SqliteProjectRepository::new(self.conn).list_projects_for_user(user_id)?)
    }

    pub fn update_project(
        &mut self,
        project_id: ProjectId,
        user_id: UserId,
        patch: ProjectPatch,
    ) -> CoreResult<Project> {
        patch.validate()?;
        logged("project_update", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize(user_id, project_id)?;
            let repo = SqliteProjectRepository::new(&tx);
            repo.update_project(project_id, &patch)?;
            let updated = read_back(&repo, project_id)?;
            tx.commit()?;
            Ok(updated)
        })
    }

    /// Deletes a project together with its entries and their history.
    pub fn delete_project(&mut self, project_id: ProjectId, user_id: UserId) -> CoreResult<()> {
        logged("project_delete", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize(user_id, project_id)?;
            SqliteProjectRepository::new(&tx).delete_project(project_id)?;
            tx.commit()?;
            Ok(())
        })
    }
}

fn read_back(repo: &SqliteProjectRepository<'_>, project_id: ProjectId) -> CoreResult<Project> {
    repo.get_project(project_id)?
        .ok_or(CoreError::NotFoundOrDenied)
}
