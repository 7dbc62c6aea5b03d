//! Style preset model.
//!
//! Presets are owned by one user and have no coupling to projects or
//! entries; entries refer to a preset only by its label.

use crate::model::entry::{validate_limits, CustomLimit};
use crate::model::user::UserId;
use crate::model::validation::{require_text, ValidationError};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

pub type PresetId = Uuid;

/// Free-form style rule configuration (`tone`, `emoji`, ...).
pub type StyleRules = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StylePreset {
    pub id: PresetId,
    pub user_id: UserId,
    /// Unique per owner.
    pub name: String,
    pub description: Option<String>,
    pub character_limits: Vec<CustomLimit>,
    pub style_rules: StyleRules,
    pub brand_keywords: Vec<String>,
    pub forbidden_words: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewStylePreset {
    pub name: String,
    pub description: Option<String>,
    pub character_limits: Vec<CustomLimit>,
    pub style_rules: StyleRules,
    pub brand_keywords: Vec<String>,
    pub forbidden_words: Vec<String>,
}

impl NewStylePreset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        validate_limits(&self.character_limits)
    }
}

/// Partial preset update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePresetPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub character_limits: Option<Vec<CustomLimit>>,
    pub style_rules: Option<StyleRules>,
    pub brand_keywords: Option<Vec<String>>,
    pub forbidden_words: Option<Vec<String>>,
}

impl StylePresetPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self.name.as_deref() {
            require_text("name", name)?;
        }
        if let Some(limits) = self.character_limits.as_deref() {
            validate_limits(limits)?;
        }
        Ok(())
    }
}
