//! Authentication session — the id token issued at sign-in.
//!
//! One `Session` is shared (via `Arc`) between the authenticator that fills
//! it and the document store that reads the bearer token from it.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;

use super::model::Principal;

#[derive(Debug, Clone)]
struct SessionToken {
    principal: Principal,
    id_token: SecretString,
    expires_at: DateTime<Utc>,
}

/// Holder of the currently signed-in principal and its id token.
#[derive(Debug, Default)]
pub struct Session {
    current: RwLock<Option<SessionToken>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful sign-in, replacing any previous one.
    pub async fn establish(&self, principal: Principal, id_token: SecretString, ttl: Duration) {
        let token = SessionToken {
            principal,
            id_token,
            expires_at: Utc::now() + ttl,
        };
        *self.current.write().await = Some(token);
    }

    /// The signed-in principal, if any (expired or not).
    pub async fn principal(&self) -> Option<Principal> {
        self.current.read().await.as_ref().map(|t| t.principal.clone())
    }

    /// The id token, if one is held and has not expired.
    pub async fn bearer(&self) -> Option<SecretString> {
        self.bearer_at(Utc::now()).await
    }

    async fn bearer_at(&self, now: DateTime<Utc>) -> Option<SecretString> {
        let current = self.current.read().await;
        current
            .as_ref()
            .filter(|t| t.expires_at > now)
            .map(|t| t.id_token.clone())
    }
}
