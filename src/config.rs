//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// What the onboarding resolver does when a document fetch fails outright
/// (as opposed to returning "no such document").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupFailurePolicy {
    /// Surface the failure; the login attempt ends with an alert.
    #[default]
    FailClosed,
    /// Treat the failure like an absent document and route to house selection.
    FailOpen,
}

impl std::str::FromStr for LookupFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_closed" | "closed" => Ok(Self::FailClosed),
            "fail_open" | "open" => Ok(Self::FailOpen),
            other => Err(format!("expected fail_closed or fail_open, got {other:?}")),
        }
    }
}

impl std::fmt::Display for LookupFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailClosed => write!(f, "fail_closed"),
            Self::FailOpen => write!(f, "fail_open"),
        }
    }
}

/// Backend configuration for the login flow.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Identity Toolkit API key.
    pub api_key: SecretString,
    /// Project that owns the `users` and `houses` collections.
    pub project_id: String,
    /// Base URL for `accounts:signInWithPassword`.
    pub identity_endpoint: String,
    /// Base URL for document fetches.
    pub firestore_endpoint: String,
    /// Per-request timeout applied to every remote call.
    pub request_timeout: Duration,
    pub lookup_failure_policy: LookupFailurePolicy,
}

impl LoginConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let api_key = SecretString::from(required("CASAL_FIREBASE_API_KEY")?);
        let project_id = required("CASAL_FIREBASE_PROJECT_ID")?;

        let identity_endpoint = lookup("CASAL_IDENTITY_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_IDENTITY_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        let firestore_endpoint = lookup("CASAL_FIRESTORE_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_FIRESTORE_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match lookup("CASAL_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "CASAL_REQUEST_TIMEOUT_SECS".to_string(),
                    message: format!("not a number of seconds: {raw:?}"),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(10),
        };

        let lookup_failure_policy = match lookup("CASAL_LOOKUP_FAILURE_POLICY") {
            Some(raw) => raw
                .parse::<LookupFailurePolicy>()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "CASAL_LOOKUP_FAILURE_POLICY".to_string(),
                    message,
                })?,
            None => LookupFailurePolicy::default(),
        };

        Ok(Self {
            api_key,
            project_id,
            identity_endpoint,
            firestore_endpoint,
            request_timeout,
            lookup_failure_policy,
        })
    }

    /// Build the HTTP client shared by the REST adapters.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}
