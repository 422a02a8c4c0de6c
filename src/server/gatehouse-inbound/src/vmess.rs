//! VMess inbound.

use gatehouse_auth::{parse_user_id, Account, AuthError};
use gatehouse_hooks::InboundCallbackManager;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handler::{Handler, InboundProtocol};

/// Body encryption requested for a VMess user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityType {
    /// Chosen by the client platform.
    #[default]
    Auto,
    /// AES-128-GCM.
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    /// ChaCha20-Poly1305.
    #[serde(rename = "chacha20-poly1305")]
    Chacha20Poly1305,
    /// No body encryption, authenticated length.
    None,
    /// No body encryption nor authentication.
    Zero,
}

/// VMess user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmessAccount {
    /// User id.
    pub id: Uuid,
    /// Body security.
    pub security: SecurityType,
}

impl VmessAccount {
    /// Builds an account from a configured id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidAccount`] for a malformed id.
    pub fn new(id: &str, security: SecurityType) -> Result<Self, AuthError> {
        Ok(Self {
            id: parse_user_id(id)?,
            security,
        })
    }
}

impl Account for VmessAccount {
    type Token = Uuid;

    fn token(&self) -> Uuid {
        self.id
    }
}

/// VMess protocol marker.
#[derive(Debug)]
pub struct Vmess;

impl InboundProtocol for Vmess {
    const NAME: &'static str = "vmess";

    type Account = VmessAccount;
    type Hooks = InboundCallbackManager;

    fn parse_presented(presented: &[u8]) -> Option<Uuid> {
        Uuid::from_slice(presented).ok()
    }
}

/// VMess inbound handler.
pub type VmessInbound = Handler<Vmess>;
