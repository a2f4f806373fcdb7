//! Authenticator trait and the credential gate in front of it.

use std::sync::Arc;

use async_trait::async_trait;

use super::codes::AuthFailureCode;
use super::model::{Credentials, Principal};
use crate::error::{AuthError, LoginError};

/// External identity provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify the credentials. One remote call, no retries.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Principal, AuthFailureCode>;
}

/// Pre-flight presence check plus failure classification around an
/// [`Authenticator`].
pub struct CredentialGate {
    authenticator: Arc<dyn Authenticator>,
}

impl CredentialGate {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }

    /// Authenticate `identifier`/`secret`.
    ///
    /// Returns [`LoginError::Validation`] without touching the provider when
    /// either field is empty, and [`LoginError::Auth`] for any provider
    /// failure.
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Principal, LoginError> {
        let credentials = Credentials::new(identifier, secret)?;

        match self.authenticator.sign_in(&credentials).await {
            Ok(principal) => {
                tracing::info!(uid = %principal.uid, "Authenticated");
                Ok(principal)
            }
            Err(code) => {
                if let AuthFailureCode::Other(ref raw) = code {
                    tracing::warn!(code = %raw, "Unrecognized authentication failure");
                }
                let err = AuthError::from(code);
                tracing::info!(error = ?err, "Authentication rejected");
                Err(LoginError::Auth(err))
            }
        }
    }
}
