//! Version history records.
//!
//! # Invariants
//! - History rows are append-only; they disappear only when their entry is
//!   deleted.
//! - A snapshot holds the entry state from before the update that created it.

use crate::model::entry::{CustomVersions, EntryId, EntryStatus};
use crate::model::user::UserId;
use serde::Serialize;
use uuid::Uuid;

pub type HistoryId = Uuid;

/// Versioned-content surface captured before a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSnapshot {
    pub original_text: String,
    pub version_90: Option<String>,
    pub version_180: Option<String>,
    pub version_700: Option<String>,
    pub custom_versions: Option<CustomVersions>,
    pub status: EntryStatus,
    pub tags: Vec<String>,
}

/// One history row annotated with the acting user's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionHistoryRecord {
    pub id: HistoryId,
    pub copy_entry_id: EntryId,
    pub user_id: Option<UserId>,
    pub user_display_name: Option<String>,
    pub snapshot: VersionSnapshot,
    pub comment: Option<String>,
    pub created_at: i64,
}
