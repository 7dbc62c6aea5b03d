//! Ownership Guard.
//!
//! # Responsibility
//! - Decide whether a principal may touch a project, an entry (through its
//!   parent project) or a style preset.
//!
//! # Invariants
//! - Absence and foreign ownership produce the same
//!   [`CoreError::NotFoundOrDenied`]; logs do not record which one it was.
//! - Entries without a project have no owner and are never authorized.
//! - Pure query: no writes, so it can run inside any transaction.

use crate::error::{CoreError, CoreResult};
use crate::model::entry::EntryId;
use crate::model::preset::PresetId;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::entry_repo::{CopyEntryRepository, SqliteCopyEntryRepository};
use crate::repo::preset_repo::{SqliteStylePresetRepository, StylePresetRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use log::debug;
use rusqlite::Connection;

/// Ownership checks over one connection or transaction.
pub struct OwnershipGuard<'conn> {
    conn: &'conn Connection,
}

impl<'conn> OwnershipGuard<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Authorizes `principal` against a project.
    pub fn authorize(&self, principal: UserId, project_id: ProjectId) -> CoreResult<()> {
        let owner = SqliteProjectRepository::new(self.conn).project_owner(project_id)?;
        check_owner(owner, principal, "project")
    }

    /// Authorizes `principal` against an entry through its parent project.
    ///
    /// Returns the entry's project id on success.
    pub fn authorize_entry(&self, principal: UserId, entry_id: EntryId) -> CoreResult<ProjectId> {
        let ownership = SqliteCopyEntryRepository::new(self.conn).entry_ownership(entry_id)?;
        check_owner(
            ownership.and_then(|found| found.owner_id),
            principal,
            "copy_entry",
        )?;
        ownership
            .and_then(|found| found.project_id)
            .ok_or(CoreError::NotFoundOrDenied)
    }

    /// Authorizes `principal` against a style preset it must own directly.
    pub fn authorize_preset(&self, principal: UserId, preset_id: PresetId) -> CoreResult<()> {
        let owner = SqliteStylePresetRepository::new(self.conn).preset_owner(preset_id)?;
        check_owner(owner, principal, "style_preset")
    }
}

fn check_owner(owner: Option<UserId>, principal: UserId, resource: &str) -> CoreResult<()> {
    if owner == Some(principal) {
        return Ok(());
    }
    debug!("event=guard_check module=guard status=denied resource={resource}");
    Err(CoreError::NotFoundOrDenied)
}
