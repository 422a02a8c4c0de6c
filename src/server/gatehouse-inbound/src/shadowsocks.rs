//! Shadowsocks inbound.
//!
//! Multi-user Shadowsocks identifies a user by the SHA-256 of its password,
//! sent as 32 raw bytes.

use std::fmt;

use gatehouse_auth::{Account, HexDigest};
use gatehouse_hooks::ServerCallbackManager;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::handler::{Handler, InboundProtocol};

/// Length of the raw password hash on the wire.
pub const KEY_LEN: usize = 32;

/// AEAD cipher configured for a Shadowsocks user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherKind {
    /// AES-128-GCM.
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    /// AES-256-GCM.
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    /// ChaCha20-IETF-Poly1305.
    #[serde(rename = "chacha20-ietf-poly1305")]
    Chacha20IetfPoly1305,
    /// XChaCha20-IETF-Poly1305.
    #[serde(rename = "xchacha20-ietf-poly1305")]
    Xchacha20IetfPoly1305,
    /// Plaintext.
    #[serde(rename = "none")]
    None,
}

/// Shadowsocks user account.
pub struct ShadowsocksAccount {
    method: CipherKind,
    password: Zeroizing<String>,
    key: HexDigest,
}

impl ShadowsocksAccount {
    /// Builds an account from a cipher and plaintext password.
    pub fn new(method: CipherKind, password: impl Into<String>) -> Self {
        let password = Zeroizing::new(password.into());
        let key = HexDigest::sha256(password.as_bytes());
        Self {
            method,
            password,
            key,
        }
    }

    /// Configured cipher.
    pub fn method(&self) -> CipherKind {
        self.method
    }

    /// The password. Handle with care.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ShadowsocksAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowsocksAccount")
            .field("method", &self.method)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Account for ShadowsocksAccount {
    type Token = HexDigest;

    fn token(&self) -> HexDigest {
        self.key.clone()
    }
}

/// Shadowsocks protocol marker.
#[derive(Debug)]
pub struct Shadowsocks;

impl InboundProtocol for Shadowsocks {
    const NAME: &'static str = "shadowsocks";

    type Account = ShadowsocksAccount;
    type Hooks = ServerCallbackManager;

    fn parse_presented(presented: &[u8]) -> Option<HexDigest> {
        if presented.len() != KEY_LEN {
            return None;
        }
        Some(HexDigest::from_presented(hex::encode(presented)))
    }
}

/// Shadowsocks inbound handler.
pub type ShadowsocksInbound = Handler<Shadowsocks>;
