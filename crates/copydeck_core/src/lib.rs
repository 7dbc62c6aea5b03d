//! Core domain logic for CopyDeck.
//!
//! Versioned copy entries grouped into user-owned projects, with automatic
//! history snapshots and a public timeline projection.

pub mod auth;
pub mod codec;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod guard;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod timeline;

pub use auth::{AuthError, Authenticator, StaticAuthenticator};
pub use config::CoreConfig;
pub use context::CoreContext;
pub use db::{open_db, open_db_in_memory, DbError};
pub use error::{CoreError, CoreResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{
    CopyEntry, CopyEntryPatch, CustomLimit, CustomVersions, EntryId, EntryStatus, LimitUnit,
    NewCopyEntry,
};
pub use model::history::{HistoryId, VersionHistoryRecord, VersionSnapshot};
pub use model::preset::{NewStylePreset, PresetId, StylePreset, StylePresetPatch};
pub use model::project::{
    NewProject, OrganizationType, Project, ProjectId, ProjectPatch, ProjectSummary,
};
pub use model::user::{NewUser, User, UserId, UserProfilePatch};
pub use model::validation::ValidationError;
pub use repo::entry_repo::{EntryListQuery, EntrySortField, SortOrder};
pub use repo::error::{RepoError, RepoResult};
pub use service::entry_service::{CopyEntryService, EntryPage};
pub use service::preset_service::StylePresetService;
pub use service::project_service::ProjectService;
pub use service::user_service::UserService;
pub use timeline::{build_timeline, TimelineEntry, TimelineVersion};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
