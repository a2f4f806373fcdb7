//! Credentials and principal types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier/secret pair for a single submit. Never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    identifier: String,
    secret: SecretString,
}

impl Credentials {
    /// Build credentials, enforcing that both fields are present.
    ///
    /// Only presence is checked; the identifier's format is the provider's call.
    pub fn new(
        identifier: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let identifier = identifier.into();
        let secret = secret.into();
        if identifier.is_empty() || secret.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(Self {
            identifier,
            secret: SecretString::from(secret),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

/// The authenticated actor, as identified by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Provider-assigned user id; also the key of the user's profile document.
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
