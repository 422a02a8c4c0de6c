//! VLESS inbound.
//!
//! Users are identified by a UUID sent as 16 raw bytes in the request header.

use gatehouse_auth::{parse_user_id, Account, AuthError};
use gatehouse_hooks::InboundCallbackManager;
use uuid::Uuid;

use crate::handler::{Handler, InboundProtocol};

/// Flow control modes a VLESS user may be configured with.
const FLOWS: &[&str] = &["", "xtls-rprx-vision"];

/// VLESS user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlessAccount {
    /// User id.
    pub id: Uuid,
    /// Flow control mode ("" for none).
    pub flow: String,
}

impl VlessAccount {
    /// Builds an account from a configured id and flow.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidAccount`] for a malformed id or an unknown
    /// flow.
    pub fn new(id: &str, flow: &str) -> Result<Self, AuthError> {
        if !FLOWS.contains(&flow) {
            return Err(AuthError::InvalidAccount(format!(
                "unsupported vless flow: {}",
                flow
            )));
        }
        Ok(Self {
            id: parse_user_id(id)?,
            flow: flow.to_string(),
        })
    }
}

impl Account for VlessAccount {
    type Token = Uuid;

    fn token(&self) -> Uuid {
        self.id
    }
}

/// VLESS protocol marker.
#[derive(Debug)]
pub struct Vless;

impl InboundProtocol for Vless {
    const NAME: &'static str = "vless";

    type Account = VlessAccount;
    type Hooks = InboundCallbackManager;

    fn parse_presented(presented: &[u8]) -> Option<Uuid> {
        Uuid::from_slice(presented).ok()
    }
}

/// VLESS inbound handler.
pub type VlessInbound = Handler<Vless>;
