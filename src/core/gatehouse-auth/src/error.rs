//! Authentication error types.

use thiserror::Error;

/// Errors returned by credential provisioning and revocation.
///
/// Lookups never fail; they report absence with `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Another credential already holds this label.
    #[error("user {0} already exists")]
    DuplicateLabel(String),

    /// Revocation requires a non-empty label.
    #[error("email must not be empty")]
    EmptyLabel,

    /// No credential holds this label.
    #[error("user {0} not found")]
    NotFound(String),

    /// Account material could not be turned into a token.
    #[error("invalid account: {0}")]
    InvalidAccount(String),
}
