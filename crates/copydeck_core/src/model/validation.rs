//! Field validation errors and helpers.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for caller-supplied fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is missing or blank.
    EmptyField(&'static str),
    /// Email does not look like `local@domain`.
    InvalidEmail(String),
    /// Custom limit item has a blank label or a zero value.
    InvalidLimit { label: String, value: u32 },
    /// Sort field is not in the sortable allow-list.
    UnsupportedSortField(String),
    /// Sort direction is neither `asc` nor `desc`.
    UnsupportedSortOrder(String),
    /// Status text does not name a workflow status.
    UnsupportedStatus(String),
    /// Tag input contains a blank value.
    InvalidTag(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` is required and cannot be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidLimit { label, value } => {
                write!(f, "invalid limit `{label}` with value {value}")
            }
            Self::UnsupportedSortField(value) => write!(f, "unsupported sort field: `{value}`"),
            Self::UnsupportedSortOrder(value) => write!(f, "unsupported sort order: `{value}`"),
            Self::UnsupportedStatus(value) => write!(f, "unsupported status: `{value}`"),
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects blank required text.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Normalizes tags: trim, lowercase, dedupe, sort.
///
/// Blank values are rejected rather than silently dropped.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut normalized = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidTag(tag.clone()));
        }
        normalized.push(trimmed.to_lowercase());
    }
    normalized.sort();
    normalized.dedup();
    Ok(normalized)
}

/// Same normalization as [`normalize_tags`], but blank values are dropped.
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    let mut cleaned = tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
    cleaned.sort();
    cleaned.dedup();
    cleaned
}

/// Maps blank optional text to `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
