//! Credential tokens.

use std::fmt;
use std::hash::Hash;

use sha2::{Digest, Sha224, Sha256};
use uuid::Uuid;

use crate::error::AuthError;

/// Longest plain string accepted as a user id before it must be a UUID.
const MAX_NAMED_ID_LEN: usize = 30;

/// Primary key of a credential.
pub trait Token: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Interprets a textual identifier as a token.
    ///
    /// Returns `None` when the text is not a well-formed token.
    fn parse_token(text: &str) -> Option<Self>;
}

impl Token for Uuid {
    fn parse_token(text: &str) -> Option<Self> {
        Uuid::parse_str(text).ok()
    }
}

/// Parses a user id as configured by an operator.
///
/// Accepts a UUID, or a plain string of 1 to 30 characters which is mapped to
/// a name-based UUID (v5, nil namespace).
///
/// # Errors
///
/// Returns an error for empty strings and for strings longer than 30
/// characters that are not UUIDs.
pub fn parse_user_id(text: &str) -> Result<Uuid, AuthError> {
    if let Ok(id) = Uuid::parse_str(text) {
        return Ok(id);
    }
    match text.len() {
        0 => Err(AuthError::InvalidAccount("user id must not be empty".into())),
        1..=MAX_NAMED_ID_LEN => Ok(Uuid::new_v5(&Uuid::nil(), text.as_bytes())),
        _ => Err(AuthError::InvalidAccount(format!(
            "invalid user id {}: expected a UUID or at most {} characters",
            text, MAX_NAMED_ID_LEN
        ))),
    }
}

/// Lowercase hex digest of a secret, used as a string-shaped token.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexDigest(String);

impl HexDigest {
    /// Hex-encoded SHA-224 of `secret`.
    pub fn sha224(secret: &[u8]) -> Self {
        Self(hex::encode(Sha224::digest(secret)))
    }

    /// Hex-encoded SHA-256 of `secret`.
    pub fn sha256(secret: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(secret)))
    }

    /// Wraps an already encoded digest as presented on the wire.
    pub fn from_presented(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the digest text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Token for HexDigest {
    fn parse_token(text: &str) -> Option<Self> {
        Some(Self::from_presented(text))
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HexDigest").field(&self.0).finish()
    }
}
