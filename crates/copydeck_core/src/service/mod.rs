//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate guard, recorder and repository calls into use-case APIs.
//! - Own transaction boundaries: every mutating operation runs its guard
//!   check and writes inside one IMMEDIATE transaction.
//!
//! # Invariants
//! - `CopyEntryService::update` is the only path that rewrites version
//!   fields, and it always snapshots first.
//! - A dropped transaction rolls back, so a failed step leaves no partial
//!   mutation behind.

use crate::error::{CoreError, CoreResult};
use log::{error, info};
use std::time::Instant;

pub mod entry_service;
pub mod history_recorder;
pub mod preset_service;
pub mod project_service;
pub mod user_service;

/// Runs one service operation and emits a metadata-only outcome event.
pub(crate) fn logged<T>(event: &'static str, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
    let started_at = Instant::now();
    let result = op();
    match &result {
        Ok(_) => info!(
            "event={event} module=service status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(CoreError::Storage(err)) => error!(
            "event={event} module=service status=error duration_ms={} error_code=storage_error error={}",
            started_at.elapsed().as_millis(),
            err
        ),
        Err(err) => info!(
            "event={event} module=service status=rejected duration_ms={} error_code={}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    result
}
