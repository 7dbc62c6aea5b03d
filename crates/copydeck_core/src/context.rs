//! Explicitly owned core runtime.
//!
//! # Responsibility
//! - Own the single connection for one embedding process.
//! - Hand out request-scoped services borrowing that connection.
//!
//! # Invariants
//! - There is no global connection; callers construct and close a context.
//! - Services borrow the context mutably, so only one runs at a time.

use crate::config::CoreConfig;
use crate::db::{open_db_with, DbError};
use crate::error::{CoreError, CoreResult};
use crate::logging::init_logging;
use crate::service::entry_service::CopyEntryService;
use crate::service::preset_service::StylePresetService;
use crate::service::project_service::ProjectService;
use crate::service::user_service::UserService;
use crate::timeline::{build_timeline, TimelineEntry};
use log::{info, warn};
use rusqlite::Connection;

/// Connection owner handing out services.
pub struct CoreContext {
    conn: Connection,
    config: CoreConfig,
}

impl CoreContext {
    /// Opens the configured store and applies migrations.
    ///
    /// When `log_dir` is set, logging is initialized first; a logging failure
    /// is reported as a warning and does not block the store.
    pub fn open(config: &CoreConfig) -> CoreResult<Self> {
        if let Some(log_dir) = config.log_dir.as_deref() {
            if let Err(err) = init_logging(&config.log_level, log_dir) {
                warn!("event=logging_init module=context status=error error={err}");
            }
        }

        let conn = open_db_with(config.db_path.as_deref(), config.busy_timeout())?;
        info!("event=context_open module=context status=ok");
        Ok(Self {
            conn,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn users(&mut self) -> CoreResult<UserService<'_>> {
        UserService::try_new(&self.conn)
    }

    pub fn projects(&mut self) -> CoreResult<ProjectService<'_>> {
        ProjectService::try_new(&mut self.conn)
    }

    pub fn entries(&mut self) -> CoreResult<CopyEntryService<'_>> {
        CopyEntryService::try_new(&mut self.conn)
    }

    pub fn presets(&mut self) -> CoreResult<StylePresetService<'_>> {
        StylePresetService::try_new(&mut self.conn)
    }

    /// Builds the public timeline with the configured limit.
    pub fn timeline(&self) -> CoreResult<Vec<TimelineEntry>> {
        build_timeline(&self.conn, self.config.timeline_limit)
    }

    /// Closes the connection, reporting any close failure.
    pub fn close(self) -> CoreResult<()> {
        self.conn
            .close()
            .map_err(|(_, err)| CoreError::from(DbError::Sqlite(err)))?;
        info!("event=context_close module=context status=ok");
        Ok(())
    }
}
