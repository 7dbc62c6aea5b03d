//! Version History Recorder.
//!
//! # Invariants
//! - `snapshot` must run inside the transaction that applies the update,
//!   before the update. If it fails the caller returns early and the
//!   transaction rolls back, so no update lands without its snapshot.
//! - The snapshot captures the full versioned-content surface, not just the
//!   fields about to change.

use crate::error::CoreResult;
use crate::model::entry::EntryId;
use crate::model::history::HistoryId;
use crate::model::user::UserId;
use crate::repo::history_repo::{HistoryRepository, SqliteHistoryRepository};
use log::debug;
use rusqlite::Connection;

pub struct VersionHistoryRecorder<'conn> {
    conn: &'conn Connection,
}

impl<'conn> VersionHistoryRecorder<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Appends an immutable copy of the entry's current state.
    pub fn snapshot(
        &self,
        entry_id: EntryId,
        acting_user: UserId,
        comment: Option<&str>,
    ) -> CoreResult<HistoryId> {
        let history_id =
            SqliteHistoryRepository::new(self.conn).snapshot_entry(entry_id, acting_user, comment)?;
        debug!("event=history_snapshot module=service status=ok history_id={history_id}");
        Ok(history_id)
    }
}
