//! Copy entry model.
//!
//! # Responsibility
//! - Define the stored entry shape: original text, three legacy version
//!   slots, and the flexible `custom_versions`/`custom_limits` pair.
//! - Define create/patch inputs with explicit "absent vs cleared" fields.
//!
//! # Invariants
//! - `original_text` is always present and non-blank.
//! - `custom_limits`, when present, describes the intended version shape;
//!   the legacy slots map onto its first three positions.
//! - Tags are lowercase, deduplicated and sorted once validated.

use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::model::validation::{normalize_tags, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type EntryId = Uuid;

/// Version-key to text mapping (`version1`, `version2`, ...).
pub type CustomVersions = BTreeMap<String, String>;

/// Author name stored for anonymous entries without one.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Legacy slot limits, in slot order.
pub const LEGACY_SLOT_LIMITS: [u32; 3] = [90, 180, 700];

/// Workflow state of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Draft,
    Review,
    Approved,
    Archived,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "approved" => Ok(Self::Approved),
            "archived" => Ok(Self::Archived),
            _ => Err(ValidationError::UnsupportedStatus(value.to_string())),
        }
    }
}

/// Unit used to measure a version against its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitUnit {
    Characters,
    Words,
}

impl LimitUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Words => "words",
        }
    }

    /// Measures `content` in this unit.
    ///
    /// Words are whitespace-delimited with empty tokens excluded; characters
    /// are Unicode scalar values including internal whitespace.
    pub fn measure(self, content: &str) -> usize {
        match self {
            Self::Words => content.split_whitespace().count(),
            Self::Characters => content.chars().count(),
        }
    }
}

/// One item of the intended version shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLimit {
    pub label: String,
    pub value: u32,
    pub unit: LimitUnit,
}

impl CustomLimit {
    pub fn new(label: impl Into<String>, value: u32, unit: LimitUnit) -> Self {
        Self {
            label: label.into(),
            value,
            unit,
        }
    }

    /// Human-readable limit such as `90 characters`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.value, self.unit.as_str())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.label.trim().is_empty() || self.value == 0 {
            return Err(ValidationError::InvalidLimit {
                label: self.label.clone(),
                value: self.value,
            });
        }
        Ok(())
    }
}

/// Three-slot schema matching the legacy `version_90/180/700` columns.
pub fn default_limit_schema() -> Vec<CustomLimit> {
    LEGACY_SLOT_LIMITS
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            CustomLimit::new(format!("Version {}", idx + 1), *value, LimitUnit::Characters)
        })
        .collect()
}

/// Version key for a zero-based schema position.
pub fn version_key(position: usize) -> String {
    format!("version{}", position + 1)
}

pub fn validate_limits(limits: &[CustomLimit]) -> Result<(), ValidationError> {
    limits.iter().try_for_each(CustomLimit::validate)
}

/// Stored copy entry, joined with its project's name and client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyEntry {
    pub id: EntryId,
    pub project_id: Option<ProjectId>,
    pub user_id: Option<UserId>,
    /// Display author for anonymous entries only.
    pub user_name: Option<String>,
    pub title: Option<String>,
    pub original_text: String,
    pub version_90: Option<String>,
    pub version_180: Option<String>,
    pub version_700: Option<String>,
    pub custom_versions: Option<CustomVersions>,
    pub custom_limits: Option<Vec<CustomLimit>>,
    pub style_preset: Option<String>,
    pub status: EntryStatus,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub project_name: Option<String>,
    pub client_name: Option<String>,
}

/// Create input shared by authenticated and anonymous paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCopyEntry {
    pub title: Option<String>,
    pub original_text: String,
    pub version_90: Option<String>,
    pub version_180: Option<String>,
    pub version_700: Option<String>,
    pub custom_versions: Option<CustomVersions>,
    pub custom_limits: Option<Vec<CustomLimit>>,
    pub style_preset: Option<String>,
    /// Defaults to `draft`.
    pub status: Option<EntryStatus>,
    pub tags: Vec<String>,
    /// Defaults to `true`.
    pub is_public: Option<bool>,
    /// Only honored on the anonymous path.
    pub user_name: Option<String>,
}

impl NewCopyEntry {
    pub fn new(original_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            ..Self::default()
        }
    }

    /// Validates required fields and returns the input with normalized tags.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        require_text("original_text", &self.original_text)?;
        if let Some(limits) = self.custom_limits.as_deref() {
            validate_limits(limits)?;
        }
        self.tags = normalize_tags(&self.tags)?;
        Ok(self)
    }
}

/// Partial entry update.
///
/// `None` keeps the stored value. For nullable columns `Some(None)` clears
/// it; required columns (`original_text`, `status`, `is_public`) cannot be
/// cleared. `comment` is attached to the history snapshot, not the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyEntryPatch {
    pub title: Option<Option<String>>,
    pub original_text: Option<String>,
    pub version_90: Option<Option<String>>,
    pub version_180: Option<Option<String>>,
    pub version_700: Option<Option<String>>,
    pub custom_versions: Option<Option<CustomVersions>>,
    pub custom_limits: Option<Option<Vec<CustomLimit>>>,
    pub style_preset: Option<Option<String>>,
    pub status: Option<EntryStatus>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub comment: Option<String>,
}

impl CopyEntryPatch {
    /// Validates supplied fields and returns the patch with normalized tags.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        if let Some(text) = self.original_text.as_deref() {
            require_text("original_text", text)?;
        }
        if let Some(Some(limits)) = self.custom_limits.as_ref() {
            validate_limits(limits)?;
        }
        if let Some(tags) = self.tags.as_ref() {
            self.tags = Some(normalize_tags(tags)?);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{default_limit_schema, version_key, CustomLimit, LimitUnit, NewCopyEntry};
    use crate::model::validation::ValidationError;

    #[test]
    fn default_schema_mirrors_legacy_slots() {
        let schema = default_limit_schema();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema[0], CustomLimit::new("Version 1", 90, LimitUnit::Characters));
        assert_eq!(schema[2].describe(), "700 characters");
        assert_eq!(version_key(2), "version3");
    }

    #[test]
    fn measure_counts_words_and_raw_characters() {
        assert_eq!(LimitUnit::Words.measure("  a  b c "), 3);
        assert_eq!(LimitUnit::Characters.measure("  a  b c "), 9);
        assert_eq!(LimitUnit::Characters.measure("héllo"), 5);
    }

    #[test]
    fn limits_deserialize_from_lowercase_units() {
        let limits: Vec<CustomLimit> =
            serde_json::from_str(r#"[{"label":"Tweet","value":280,"unit":"characters"}]"#)
                .unwrap();
        assert_eq!(limits[0].describe(), "280 characters");
    }

    #[test]
    fn new_entry_requires_original_text() {
        let err = NewCopyEntry::new("   ").validated().unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("original_text"));
    }

    #[test]
    fn new_entry_rejects_zero_limits() {
        let mut fields = NewCopyEntry::new("copy");
        fields.custom_limits = Some(vec![CustomLimit::new("V1", 0, LimitUnit::Words)]);
        assert!(matches!(
            fields.validated(),
            Err(ValidationError::InvalidLimit { .. })
        ));
    }
}
