//! Credential gate — turns an (identifier, secret) pair into an
//! authenticated [`Principal`] or a closed [`AuthError`](crate::error::AuthError).
//!
//! The identity provider sits behind the [`Authenticator`] trait. The REST
//! implementation records the issued id token in a shared [`Session`] so the
//! document store can authorize its reads.

pub mod codes;
pub mod gate;
pub mod identity_toolkit;
pub mod model;
pub mod session;

pub use codes::AuthFailureCode;
pub use gate::{Authenticator, CredentialGate};
pub use identity_toolkit::IdentityToolkitAuthenticator;
pub use model::{Credentials, Principal};
pub use session::Session;
