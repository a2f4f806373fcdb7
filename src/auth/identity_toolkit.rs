//! Identity Toolkit REST authenticator (`accounts:signInWithPassword`).

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::codes::AuthFailureCode;
use super::gate::Authenticator;
use super::model::{Credentials, Principal};
use super::session::Session;
use crate::config::LoginConfig;
use crate::error::ConfigError;

/// Lifetime assumed for an id token when the provider omits `expiresIn`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
/// Upper bound on a reported token lifetime.
const MAX_TOKEN_TTL_SECS: i64 = 86_400;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Authenticator backed by the Identity Toolkit REST API.
pub struct IdentityToolkitAuthenticator {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    session: Arc<Session>,
}

impl IdentityToolkitAuthenticator {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: SecretString,
        session: Arc<Session>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            session,
        }
    }

    pub fn from_config(config: &LoginConfig, session: Arc<Session>) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.http_client()?,
            config.identity_endpoint.clone(),
            config.api_key.clone(),
            session,
        ))
    }

    fn sign_in_url(&self) -> String {
        format!("{}/accounts:signInWithPassword", self.endpoint)
    }
}

/// Classify a non-success response body.
fn failure_from_body(status: u16, body: &str) -> AuthFailureCode {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => AuthFailureCode::parse(&envelope.error.message),
        Err(_) => AuthFailureCode::Other(format!("http {status}")),
    }
}

fn token_ttl(expires_in: Option<&str>) -> chrono::Duration {
    let secs = expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_SECS)
        .clamp(0, MAX_TOKEN_TTL_SECS);
    chrono::Duration::seconds(secs)
}

#[async_trait]
impl Authenticator for IdentityToolkitAuthenticator {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Principal, AuthFailureCode> {
        let body = SignInRequest {
            email: credentials.identifier(),
            password: credentials.expose_secret(),
            return_secure_token: true,
        };

        // The request URL carries the API key, so errors are formatted without it.
        let resp = self
            .client
            .post(self.sign_in_url())
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthFailureCode::network(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(failure_from_body(status.as_u16(), &text));
        }

        let parsed: SignInResponse = resp.json().await.map_err(|e| {
            AuthFailureCode::Other(format!("malformed sign-in response: {}", e.without_url()))
        })?;

        let mut principal = Principal::new(parsed.local_id);
        if let Some(email) = parsed.email {
            principal = principal.with_email(email);
        }

        self.session
            .establish(
                principal.clone(),
                SecretString::from(parsed.id_token),
                token_ttl(parsed.expires_in.as_deref()),
            )
            .await;

        Ok(principal)
    }
}
