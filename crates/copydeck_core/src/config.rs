//! Core runtime configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config that
//! opens an in-memory store.

use crate::logging::default_log_level;
use crate::timeline::TIMELINE_DEFAULT_LIMIT;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration consumed by [`crate::context::CoreContext::open`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Database file; `None` opens an isolated in-memory store.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    /// Bound on how long a store call waits for a locked database.
    pub busy_timeout_ms: u64,
    /// Entries returned by the public timeline.
    pub timeline_limit: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            timeline_limit: TIMELINE_DEFAULT_LIMIT,
        }
    }
}

impl CoreConfig {
    /// Config for a database file with all other fields defaulted.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parses config from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use crate::logging::default_log_level;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.db_path, None);
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.timeline_limit, 50);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config = CoreConfig::from_json_str(
            r#"{"db_path":"/tmp/copydeck.sqlite3","busy_timeout_ms":250,"timeline_limit":10}"#,
        )
        .expect("config should parse");
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/copydeck.sqlite3")));
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.timeline_limit, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(CoreConfig::from_json_str(r#"{"db_file":"x"}"#).is_err());
    }
}
