//! Public timeline projection.
//!
//! # Responsibility
//! - Read the most recent public entries and reconcile their version data
//!   into one uniform shape with computed counts.
//!
//! # Invariants
//! - Read-only: no writes, no ownership checks (rows are pre-filtered by
//!   `is_public`).
//! - One malformed row degrades to the default three-slot schema for that
//!   row only; the batch never fails on decode errors.
//! - Output order is the store's "newest first" order; nothing is re-sorted.
//! - Entries with no non-empty version are omitted.

use crate::codec::{decode_field, Decoded};
use crate::error::CoreResult;
use crate::model::entry::{
    default_limit_schema, version_key, CustomLimit, CustomVersions, EntryId,
};
use crate::model::user::display_name_from_parts;
use crate::model::validation::non_blank;
use crate::repo::entry_repo::{CopyEntryRepository, PublicEntryRow, SqliteCopyEntryRepository};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;

/// Number of entries returned when the caller passes `0`.
pub const TIMELINE_DEFAULT_LIMIT: u32 = 50;
/// Upper bound for one timeline read.
pub const TIMELINE_MAX_LIMIT: u32 = 200;

/// One reconciled version of a timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineVersion {
    /// Version key such as `version1`.
    pub key: String,
    pub label: String,
    pub content: String,
    /// Human-readable limit, e.g. `90 characters`.
    pub limit: String,
    pub actual_count: usize,
}

/// Anonymization-safe projection of one public entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub id: EntryId,
    pub title: Option<String>,
    pub original_text: String,
    pub author_name: Option<String>,
    pub style_preset: Option<String>,
    pub created_at: i64,
    /// Versions in limit-schema order.
    pub versions: Vec<TimelineVersion>,
}

/// Which structured fields of a row fell back to defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeFallback {
    pub custom_limits: bool,
    pub custom_versions: bool,
}

impl DecodeFallback {
    pub fn any(self) -> bool {
        self.custom_limits || self.custom_versions
    }
}

/// Builds the public timeline, newest first.
///
/// `limit == 0` selects [`TIMELINE_DEFAULT_LIMIT`]; larger values are capped
/// at [`TIMELINE_MAX_LIMIT`].
pub fn build_timeline(conn: &Connection, limit: u32) -> CoreResult<Vec<TimelineEntry>> {
    let applied_limit = normalize_timeline_limit(limit);
    let rows = SqliteCopyEntryRepository::new(conn).list_public_rows(applied_limit)?;
    let row_count = rows.len();

    let mut entries = Vec::with_capacity(row_count);
    for row in &rows {
        let (entry, fallback) = reconcile_with_diagnostics(row);
        if fallback.any() {
            warn!(
                "event=timeline_decode_fallback module=timeline status=degraded entry_id={} custom_limits={} custom_versions={}",
                row.id, fallback.custom_limits, fallback.custom_versions
            );
        }
        entries.extend(entry);
    }

    info!(
        "event=timeline_build module=timeline status=ok limit={} rows={} entries={}",
        applied_limit,
        row_count,
        entries.len()
    );
    Ok(entries)
}

/// Reconciles one public row; `None` when it has no non-empty version.
pub fn reconcile_entry(row: &PublicEntryRow) -> Option<TimelineEntry> {
    reconcile_with_diagnostics(row).0
}

/// Reconciles one public row and reports which fields fell back.
pub fn reconcile_with_diagnostics(
    row: &PublicEntryRow,
) -> (Option<TimelineEntry>, DecodeFallback) {
    let mut fallback = DecodeFallback::default();

    let schema = match decode_field::<Vec<CustomLimit>>(row.custom_limits.as_deref()) {
        Decoded::Present(limits) if !limits.is_empty() => limits,
        Decoded::Malformed => {
            fallback.custom_limits = true;
            default_limit_schema()
        }
        _ => default_limit_schema(),
    };

    let custom_versions = match decode_field::<CustomVersions>(row.custom_versions.as_deref()) {
        Decoded::Present(versions) => versions,
        Decoded::Malformed => {
            fallback.custom_versions = true;
            CustomVersions::new()
        }
        Decoded::Absent => CustomVersions::new(),
    };

    let versions = schema
        .iter()
        .enumerate()
        .filter_map(|(position, limit)| {
            let key = version_key(position);
            let content = custom_versions
                .get(&key)
                .map(String::as_str)
                .or_else(|| legacy_slot(row, position))?;
            if content.trim().is_empty() {
                return None;
            }
            Some(TimelineVersion {
                label: limit.label.clone(),
                content: content.to_string(),
                limit: limit.describe(),
                actual_count: limit.unit.measure(content),
                key,
            })
        })
        .collect::<Vec<_>>();

    if versions.is_empty() {
        return (None, fallback);
    }

    let entry = TimelineEntry {
        id: row.id,
        title: row.title.clone(),
        original_text: row.original_text.clone(),
        author_name: author_name(row),
        style_preset: row.style_preset.clone(),
        created_at: row.created_at,
        versions,
    };
    (Some(entry), fallback)
}

fn normalize_timeline_limit(limit: u32) -> u32 {
    match limit {
        0 => TIMELINE_DEFAULT_LIMIT,
        other => other.min(TIMELINE_MAX_LIMIT),
    }
}

fn legacy_slot(row: &PublicEntryRow, position: usize) -> Option<&str> {
    match position {
        0 => row.version_90.as_deref(),
        1 => row.version_180.as_deref(),
        2 => row.version_700.as_deref(),
        _ => None,
    }
}

fn author_name(row: &PublicEntryRow) -> Option<String> {
    if let Some(name) = non_blank(row.user_name.as_deref()) {
        return Some(name.trim().to_string());
    }
    display_name_from_parts(
        row.first_name.as_deref(),
        row.last_name.as_deref(),
        row.email.as_deref(),
    )
}
