//! Provider failure codes and their mapping onto [`AuthError`].

use crate::error::AuthError;

/// A failure code reported by the identity provider.
///
/// Parsed once at the adapter boundary; everything downstream matches on
/// this enum instead of raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailureCode {
    /// No account exists for the identifier.
    UserNotFound,
    /// The account exists but the secret is wrong.
    WrongPassword,
    /// The identifier is not a well-formed email address.
    InvalidEmail,
    /// Anything else, kept verbatim for logging only.
    Other(String),
}

impl AuthFailureCode {
    /// Parse a provider code. Accepts SDK codes (`auth/wrong-password`) and
    /// REST messages (`INVALID_PASSWORD`, optionally with ` : detail`).
    pub fn parse(raw: &str) -> Self {
        let code = raw.split(" : ").next().unwrap_or(raw).trim();
        match code {
            "auth/user-not-found" | "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "auth/wrong-password" | "INVALID_PASSWORD" => Self::WrongPassword,
            "auth/invalid-email" | "INVALID_EMAIL" => Self::InvalidEmail,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Transport-level failure talking to the provider.
    pub fn network(reason: impl std::fmt::Display) -> Self {
        Self::Other(format!("auth/network-request-failed: {reason}"))
    }
}

impl From<AuthFailureCode> for AuthError {
    fn from(code: AuthFailureCode) -> Self {
        match code {
            AuthFailureCode::UserNotFound => AuthError::NotFound,
            AuthFailureCode::WrongPassword => AuthError::Rejected,
            AuthFailureCode::InvalidEmail => AuthError::Malformed,
            AuthFailureCode::Other(_) => AuthError::Unknown,
        }
    }
}
