//! Error types for the login flow.

/// Title used for every user-facing alert.
pub const ALERT_TITLE: &str = "Erro";

/// Generic alert text used when no more specific message applies.
pub const GENERIC_LOGIN_MESSAGE: &str = "Erro ao fazer login.";

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Local, pre-flight validation failures. Raised before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing fields")]
    MissingFields,
}

impl ValidationError {
    /// Text shown in the alert for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingFields => "Preencha todos os campos.",
        }
    }
}

/// Credential-stage failures, as presented to the user.
///
/// Closed set: every provider failure code resolves to exactly one variant
/// (see [`crate::auth::AuthFailureCode`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Usuário não encontrado.")]
    NotFound,

    #[error("Senha incorreta.")]
    Rejected,

    #[error("Email inválido.")]
    Malformed,

    #[error("Erro ao fazer login.")]
    Unknown,
}

impl AuthError {
    /// Text shown in the alert for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound => "Usuário não encontrado.",
            Self::Rejected => "Senha incorreta.",
            Self::Malformed => "Email inválido.",
            Self::Unknown => GENERIC_LOGIN_MESSAGE,
        }
    }
}

/// Document-store failures. Absence of a document is not an error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Request to {collection}/{id} failed: {reason}")]
    Transport {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Unexpected status {status} fetching {collection}/{id}")]
    Status {
        collection: String,
        id: String,
        status: u16,
    },

    #[error("Failed to decode {collection}/{id}: {reason}")]
    Decode {
        collection: String,
        id: String,
        reason: String,
    },
}

/// Everything a single submit can end in, short of a navigation reset.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Onboarding lookup failed: {0}")]
    Lookup(#[from] StoreError),

    #[error("A login attempt is already in progress")]
    InFlight,
}

impl LoginError {
    /// Alert text for this error, or `None` when the error is silent.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Validation(e) => Some(e.user_message()),
            Self::Auth(e) => Some(e.user_message()),
            Self::Lookup(_) => Some(GENERIC_LOGIN_MESSAGE),
            Self::InFlight => None,
        }
    }
}
