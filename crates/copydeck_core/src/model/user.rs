//! User identity record.
//!
//! Credential hashing and token issuance live outside this crate; the core
//! only stores the identity and profile fields needed for display names.

use crate::model::validation::{non_blank, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Stored user identity and profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique, compared case-insensitively.
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Name shown next to history rows and timeline entries.
    pub fn display_name(&self) -> Option<String> {
        display_name_from_parts(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            Some(self.email.as_str()),
        )
    }
}

/// Registration input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)
    }
}

/// Partial profile update. `None` keeps the stored value, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfilePatch {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Resolves a display name as `first [last]`, else the email local-part.
///
/// A last name alone is not enough; it only decorates a first name.
pub fn display_name_from_parts(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
) -> Option<String> {
    if let Some(first) = non_blank(first_name) {
        let mut name = first.trim().to_string();
        if let Some(last) = non_blank(last_name) {
            name.push(' ');
            name.push_str(last.trim());
        }
        return Some(name);
    }

    let local_part = email?.split('@').next()?.trim();
    if local_part.is_empty() {
        None
    } else {
        Some(local_part.to_string())
    }
}
