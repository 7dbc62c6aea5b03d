//! Copy Entry Service.
//!
//! # Responsibility
//! - Single mutation entry point for copy entries.
//! - Compose guard check, history snapshot and write into one transaction.
//!
//! # Invariants
//! - Every `update`/`restore_version` snapshots the pre-update state first.
//! - Owner-scoped operations report `NotFoundOrDenied` for both missing and
//!   foreign entries.
//! - Validation runs before any storage access.

use crate::error::{CoreError, CoreResult};
use crate::guard::OwnershipGuard;
use crate::model::entry::{CopyEntry, CopyEntryPatch, EntryId, NewCopyEntry, ANONYMOUS_AUTHOR};
use crate::model::history::{HistoryId, VersionHistoryRecord};
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::model::validation::{clean_tags, non_blank, require_text};
use crate::repo::entry_repo::{
    normalize_entry_limit, CopyEntryRepository, EntryListQuery, SqliteCopyEntryRepository,
};
use crate::repo::history_repo::{HistoryRepository, SqliteHistoryRepository};
use crate::service::history_recorder::VersionHistoryRecorder;
use crate::service::logged;
use rusqlite::{Connection, TransactionBehavior};

const UNTITLED: &str = "Untitled";

/// One page of a project's entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPage {
    pub items: Vec<CopyEntry>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Copy entry use-cases over one connection.
pub struct CopyEntryService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> CopyEntryService<'conn> {
    /// Creates a service from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> CoreResult<Self> {
        SqliteCopyEntryRepository::try_new(conn)?;
        SqliteHistoryRepository::try_new(conn)?;
        Ok(Self { conn })
    }

    /// Creates an entry inside a project owned by `user_id`.
    ///
    /// The returned entry carries the project's name and client.
    pub fn create_authenticated(
        &mut self,
        project_id: ProjectId,
        user_id: UserId,
        fields: NewCopyEntry,
    ) -> CoreResult<CopyEntry> {
        let mut fields = fields.validated()?;
        fields.user_name = None;

        logged("entry_create", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize(user_id, project_id)?;
            let repo = SqliteCopyEntryRepository::new(&tx);
            let entry_id = repo.insert_entry(Some(project_id), Some(user_id), &fields)?;
            let created = read_back(&repo, entry_id)?;
            tx.commit()?;
            Ok(created)
        })
    }

    /// Creates a project-less, ownerless entry. No ownership check applies.
    ///
    /// Only `original_text` is required. Custom versions, limits and the
    /// style preset are stored as supplied; blank tags are dropped.
    pub fn create_anonymous(&self, mut fields: NewCopyEntry) -> CoreResult<CopyEntry> {
        require_text("original_text", &fields.original_text)?;
        fields.tags = clean_tags(&fields.tags);
        let author = non_blank(fields.user_name.as_deref())
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());
        fields.user_name = Some(author);
        fields.is_public = Some(fields.is_public.unwrap_or(true));

        logged("entry_create_anonymous", || {
            let repo = SqliteCopyEntryRepository::new(self.conn);
            let entry_id = repo.insert_entry(None, None, &fields)?;
            read_back(&repo, entry_id)
        })
    }

    /// Fetches an entry by id without an ownership check.
    pub fn get(&self, entry_id: EntryId) -> CoreResult<CopyEntry> {
        read_back(&SqliteCopyEntryRepository::new(self.conn), entry_id)
    }

    /// Fetches an entry only if `user_id` owns its project.
    pub fn get_for_owner(&self, entry_id: EntryId, user_id: UserId) -> CoreResult<CopyEntry> {
        OwnershipGuard::new(self.conn).authorize_entry(user_id, entry_id)?;
        self.get(entry_id)
    }

    /// Applies a partial update after snapshotting the current state.
    ///
    /// Fields omitted from `patch` keep their stored values.
    pub fn update(
        &mut self,
        entry_id: EntryId,
        user_id: UserId,
        patch: CopyEntryPatch,
    ) -> CoreResult<CopyEntry> {
        let patch = patch.validated()?;

        logged("entry_update", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize_entry(user_id, entry_id)?;
            VersionHistoryRecorder::new(&tx).snapshot(entry_id, user_id, patch.comment.as_deref())?;
            let repo = SqliteCopyEntryRepository::new(&tx);
            repo.update_entry(entry_id, &patch)?;
            let updated = read_back(&repo, entry_id)?;
            tx.commit()?;
            Ok(updated)
        })
    }

    /// Hard-deletes an entry; its history goes with it.
    pub fn delete(&mut self, entry_id: EntryId, user_id: UserId) -> CoreResult<()> {
        logged("entry_delete", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize_entry(user_id, entry_id)?;
            SqliteCopyEntryRepository::new(&tx).delete_entry(entry_id)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Copies an entry's text, versions and tags into a new entry.
    ///
    /// The copy lands in `target_project_id` (default: the source's project),
    /// which must also belong to `user_id`. Without `new_title` the copy is
    /// titled `"<source title> (Copy)"`. The copy has no history.
    pub fn duplicate(
        &mut self,
        entry_id: EntryId,
        user_id: UserId,
        new_title: Option<String>,
        target_project_id: Option<ProjectId>,
    ) -> CoreResult<CopyEntry> {
        logged("entry_duplicate", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            let guard = OwnershipGuard::new(&tx);
            let source_project = guard.authorize_entry(user_id, entry_id)?;
            let target_project = target_project_id.unwrap_or(source_project);
            if target_project != source_project {
                guard.authorize(user_id, target_project)?;
            }

            let repo = SqliteCopyEntryRepository::new(&tx);
            let source = read_back(&repo, entry_id)?;
            let title = match non_blank(new_title.as_deref()) {
                Some(title) => title.trim().to_string(),
                None => format!(
                    "{} (Copy)",
                    non_blank(source.title.as_deref()).unwrap_or(UNTITLED)
                ),
            };

            let copy_id = repo.duplicate_entry(entry_id, Some(target_project), user_id, &title)?;
            let copy = read_back(&repo, copy_id)?;
            tx.commit()?;
            Ok(copy)
        })
    }

    /// Lists a project's entries with filters, ordering and pagination.
    pub fn list_for_project(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        query: &EntryListQuery,
    ) -> CoreResult<EntryPage> {
        OwnershipGuard::new(self.conn).authorize(user_id, project_id)?;
        let applied_limit = normalize_entry_limit(query.limit);
        let query = EntryListQuery {
            limit: Some(applied_limit),
            ..query.clone()
        };
        let items =
            SqliteCopyEntryRepository::new(self.conn).list_entries_for_project(project_id, &query)?;
        Ok(EntryPage {
            items,
            applied_limit,
        })
    }

    /// Returns the entry's history, newest first.
    pub fn get_history(
        &self,
        entry_id: EntryId,
        user_id: UserId,
    ) -> CoreResult<Vec<VersionHistoryRecord>> {
        OwnershipGuard::new(self.conn).authorize_entry(user_id, entry_id)?;
        Ok(SqliteHistoryRepository::new(self.conn).list_history(entry_id)?)
    }

    /// Writes a history row's versioned fields back onto its entry.
    ///
    /// This is an update: the pre-restore state is snapshotted first.
    pub fn restore_version(
        &mut self,
        entry_id: EntryId,
        history_id: HistoryId,
        user_id: UserId,
    ) -> CoreResult<CopyEntry> {
        logged("entry_restore", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize_entry(user_id, entry_id)?;
            let record = SqliteHistoryRepository::new(&tx)
                .get_history_record(history_id)?
                .filter(|record| record.copy_entry_id == entry_id)
                .ok_or(CoreError::NotFoundOrDenied)?;

            let comment = format!("restore {}", record.id);
            VersionHistoryRecorder::new(&tx).snapshot(entry_id, user_id, Some(&comment))?;
            let repo = SqliteCopyEntryRepository::new(&tx);
            repo.restore_from_history(entry_id, record.id)?;
            let restored = read_back(&repo, entry_id)?;
            tx.commit()?;
            Ok(restored)
        })
    }
}

fn read_back(repo: &SqliteCopyEntryRepository<'_>, entry_id: EntryId) -> CoreResult<CopyEntry> {
    repo.get_entry(entry_id)?.ok_or(CoreError::NotFoundOrDenied)
}
