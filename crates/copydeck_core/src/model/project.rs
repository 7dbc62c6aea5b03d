//! Project model.
//!
//! # Invariants
//! - `name` is never blank.
//! - A project is owned by exactly one user; that owner is the access
//!   principal for every entry inside it.

use crate::model::user::UserId;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

/// How a project groups its copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    #[default]
    None,
    Channel,
    Genre,
}

impl OrganizationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Channel => "channel",
            Self::Genre => "genre",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "channel" => Some(Self::Channel),
            "genre" => Some(Self::Genre),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub brand_guidelines: Option<String>,
    pub organization_type: OrganizationType,
    /// Channel or genre name; meaningless when `organization_type` is `None`.
    pub organization_value: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Project list item with its entry count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project: Project,
    pub entry_count: u32,
}

/// Create input for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub brand_guidelines: Option<String>,
    pub organization_type: OrganizationType,
    pub organization_value: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

/// Partial project update.
///
/// `None` keeps the stored value. For nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub client_name: Option<Option<String>>,
    pub brand_guidelines: Option<Option<String>>,
    pub organization_type: Option<OrganizationType>,
    pub organization_value: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.name.as_deref() {
            Some(name) => require_text("name", name),
            None => Ok(()),
        }
    }
}
