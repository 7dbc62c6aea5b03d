//! Service-level error taxonomy.
//!
//! # Invariants
//! - `NotFoundOrDenied` carries no identifier and is produced identically
//!   for "does not exist" and "exists but belongs to someone else".
//! - Repository `NotFound` always becomes `NotFoundOrDenied`.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Error returned by every service operation.
#[derive(Debug)]
pub enum CoreError {
    /// Missing or malformed caller input; not retried.
    Validation(ValidationError),
    /// Resource absent or not owned by the principal.
    NotFoundOrDenied,
    /// Uniqueness conflict such as a duplicate email or preset name.
    Conflict(String),
    /// Persistence failure; the whole operation was rolled back.
    Storage(RepoError),
}

impl CoreError {
    /// Stable machine-readable code for callers mapping to transport errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFoundOrDenied => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFoundOrDenied => write!(f, "resource not found"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFoundOrDenied | Self::Conflict(_) => None,
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { .. } => Self::NotFoundOrDenied,
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for CoreError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(RepoError::from(value))
    }
}
