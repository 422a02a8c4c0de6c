//! Trojan inbound.
//!
//! Clients send the SHA-224 of their password as 56 lowercase hex characters.

use std::fmt;

use gatehouse_auth::{Account, HexDigest};
use gatehouse_hooks::ServerCallbackManager;
use zeroize::Zeroizing;

use crate::handler::{Handler, InboundProtocol};

/// Length of the hex-encoded password hash on the wire.
pub const KEY_LEN: usize = 56;

/// Trojan user account.
pub struct TrojanAccount {
    password: Zeroizing<String>,
    key: HexDigest,
}

impl TrojanAccount {
    /// Builds an account from a plaintext password.
    pub fn new(password: impl Into<String>) -> Self {
        let password = Zeroizing::new(password.into());
        let key = HexDigest::sha224(password.as_bytes());
        Self { password, key }
    }

    /// The password. Handle with care.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Hex-encoded SHA-224 of the password.
    pub fn key(&self) -> &HexDigest {
        &self.key
    }
}

impl fmt::Debug for TrojanAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrojanAccount")
            .field("password", &"[REDACTED]")
            .field("key", &self.key)
            .finish()
    }
}

impl Account for TrojanAccount {
    type Token = HexDigest;

    fn token(&self) -> HexDigest {
        self.key.clone()
    }
}

/// Trojan protocol marker.
#[derive(Debug)]
pub struct Trojan;

impl InboundProtocol for Trojan {
    const NAME: &'static str = "trojan";

    type Account = TrojanAccount;
    type Hooks = ServerCallbackManager;

    fn parse_presented(presented: &[u8]) -> Option<HexDigest> {
        if presented.len() != KEY_LEN || !presented.iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
        let text = std::str::from_utf8(presented).ok()?;
        Some(HexDigest::from_presented(text.to_ascii_lowercase()))
    }
}

/// Trojan inbound handler.
pub type TrojanInbound = Handler<Trojan>;
