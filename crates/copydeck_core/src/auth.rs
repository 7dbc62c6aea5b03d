//! Authentication capability.
//!
//! The core never parses or verifies credentials itself. Transport layers
//! plug in an [`Authenticator`] and pass the resolved [`UserId`] to services.

use crate::model::user::UserId;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to resolve a credential into a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented.
    MissingCredential,
    /// Credential is malformed, expired or unknown.
    InvalidCredential,
    /// The identity backend could not be reached.
    Unavailable(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing credential"),
            Self::InvalidCredential => write!(f, "invalid credential"),
            Self::Unavailable(message) => write!(f, "authentication unavailable: {message}"),
        }
    }
}

impl Error for AuthError {}

/// Resolves a presented credential to the acting user.
pub trait Authenticator {
    fn authenticate(&self, credential: &str) -> Result<UserId, AuthError>;
}

/// Fixed credential table, for local tooling and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    credentials: HashMap<String, UserId>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(mut self, credential: impl Into<String>, user_id: UserId) -> Self {
        self.credentials.insert(credential.into(), user_id);
        self
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(&self, credential: &str) -> Result<UserId, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        self.credentials
            .get(credential)
            .copied()
            .ok_or(AuthError::InvalidCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthError, Authenticator, StaticAuthenticator};
    use uuid::Uuid;

    #[test]
    fn static_authenticator_resolves_known_credentials() {
        let user_id = Uuid::new_v4();
        let auth = StaticAuthenticator::new().with_credential("token-a", user_id);

        assert_eq!(auth.authenticate(" token-a "), Ok(user_id));
        assert_eq!(auth.authenticate("token-b"), Err(AuthError::InvalidCredential));
        assert_eq!(auth.authenticate("  "), Err(AuthError::MissingCredential));
    }
}
