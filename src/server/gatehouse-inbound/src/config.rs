//! Inbound configuration.
//!
//! Loaded from JSON:
//!
//! ```json
//! {
//!   "policy": { "levels": { "0": { "handshake": 4, "conn_idle": 300 } } },
//!   "inbounds": [
//!     {
//!       "tag": "trojan-in",
//!       "protocol": "trojan",
//!       "settings": { "clients": [ { "email": "a@example.com", "password": "..." } ] }
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use gatehouse_auth::User;
use gatehouse_hooks::PolicyLevels;
use serde::Deserialize;
use tracing::info;

use crate::error::InboundError;
use crate::handler::{Handler, InboundProtocol};
use crate::shadowsocks::{CipherKind, ShadowsocksAccount, ShadowsocksInbound};
use crate::trojan::{TrojanAccount, TrojanInbound};
use crate::vless::{VlessAccount, VlessInbound};
use crate::vmess::{SecurityType, VmessAccount, VmessInbound};

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Session policies.
    pub policy: PolicyConfig,
    /// Inbound handlers to create.
    pub inbounds: Vec<InboundConfig>,
}

/// Session policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Policies keyed by user level.
    pub levels: PolicyLevels,
}

/// One inbound handler.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundConfig {
    /// Unique tag.
    pub tag: String,
    /// Protocol and its settings.
    #[serde(flatten)]
    pub protocol: ProtocolSettings,
}

/// Protocol-specific inbound settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "protocol", content = "settings", rename_all = "lowercase")]
pub enum ProtocolSettings {
    /// Trojan users.
    Trojan(Clients<TrojanClient>),
    /// VLESS users.
    Vless(Clients<VlessClient>),
    /// VMess users.
    Vmess(Clients<VmessClient>),
    /// Shadowsocks users.
    Shadowsocks(Clients<ShadowsocksClient>),
}

/// Users provisioned at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "C: Deserialize<'de>"))]
pub struct Clients<C> {
    /// Client list.
    #[serde(default = "Vec::new")]
    pub clients: Vec<C>,
}

/// Trojan client entry.
#[derive(Clone, Deserialize)]
pub struct TrojanClient {
    /// Email label, empty for anonymous users.
    #[serde(default)]
    pub email: String,
    /// Policy level.
    #[serde(default)]
    pub level: u32,
    /// Plaintext password.
    pub password: String,
}

/// VLESS client entry.
#[derive(Debug, Clone, Deserialize)]
pub struct VlessClient {
    /// Email label, empty for anonymous users.
    #[serde(default)]
    pub email: String,
    /// Policy level.
    #[serde(default)]
    pub level: u32,
    /// UUID or short id string.
    pub id: String,
    /// Flow control mode.
    #[serde(default)]
    pub flow: String,
}

/// VMess client entry.
#[derive(Debug, Clone, Deserialize)]
pub struct VmessClient {
    /// Email label, empty for anonymous users.
    #[serde(default)]
    pub email: String,
    /// Policy level.
    #[serde(default)]
    pub level: u32,
    /// UUID or short id string.
    pub id: String,
    /// Body security.
    #[serde(default)]
    pub security: SecurityType,
}

/// Shadowsocks client entry.
#[derive(Clone, Deserialize)]
pub struct ShadowsocksClient {
    /// Email label, empty for anonymous users.
    #[serde(default)]
    pub email: String,
    /// Policy level.
    #[serde(default)]
    pub level: u32,
    /// Cipher.
    pub method: CipherKind,
    /// Plaintext password.
    pub password: String,
}

impl std::fmt::Debug for TrojanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrojanClient")
            .field("email", &self.email)
            .field("level", &self.level)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for ShadowsocksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowsocksClient")
            .field("email", &self.email)
            .field("level", &self.level)
            .field("method", &self.method)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Parses a configuration document.
    pub fn from_json(json: &str) -> Result<Self, InboundError> {
        serde_json::from_str(json)
            .map_err(|e| InboundError::Config(format!("invalid config: {}", e)))
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InboundError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InboundError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Creates every configured inbound and provisions its clients.
    ///
    /// # Errors
    ///
    /// Fails on duplicate tags, malformed accounts, and duplicate emails
    /// within one inbound.
    pub fn build(&self) -> Result<InboundSet, InboundError> {
        let mut seen = HashSet::new();
        let mut inbounds = Vec::with_capacity(self.inbounds.len());

        for config in &self.inbounds {
            if !seen.insert(config.tag.as_str()) {
                return Err(InboundError::Config(format!(
                    "duplicate inbound tag: {}",
                    config.tag
                )));
            }
            inbounds.push(config.build(&self.policy.levels)?);
        }

        Ok(InboundSet { inbounds })
    }
}

impl InboundConfig {
    /// Creates the inbound and provisions its clients.
    pub fn build(&self, levels: &PolicyLevels) -> Result<AnyInbound, InboundError> {
        let inbound = match &self.protocol {
            ProtocolSettings::Trojan(settings) => {
                let handler = TrojanInbound::new(self.tag.as_str(), levels.clone());
                provision(&handler, &settings.clients, |c| {
                    let account = TrojanAccount::new(c.password.as_str());
                    Ok(User::new(c.email.as_str(), c.level, account))
                })?;
                AnyInbound::Trojan(Arc::new(handler))
            },
            ProtocolSettings::Vless(settings) => {
                let handler = VlessInbound::new(self.tag.as_str(), levels.clone());
                provision(&handler, &settings.clients, |c| {
                    let account = VlessAccount::new(&c.id, &c.flow)?;
                    Ok(User::new(c.email.as_str(), c.level, account))
                })?;
                AnyInbound::Vless(Arc::new(handler))
            },
            ProtocolSettings::Vmess(settings) => {
                let handler = VmessInbound::new(self.tag.as_str(), levels.clone());
                provision(&handler, &settings.clients, |c| {
                    let account = VmessAccount::new(&c.id, c.security)?;
                    Ok(User::new(c.email.as_str(), c.level, account))
                })?;
                AnyInbound::Vmess(Arc::new(handler))
            },
            ProtocolSettings::Shadowsocks(settings) => {
                let handler = ShadowsocksInbound::new(self.tag.as_str(), levels.clone());
                provision(&handler, &settings.clients, |c| {
                    let account = ShadowsocksAccount::new(c.method, c.password.as_str());
                    Ok(User::new(c.email.as_str(), c.level, account))
                })?;
                AnyInbound::Shadowsocks(Arc::new(handler))
            },
        };

        info!(
            tag = inbound.tag(),
            protocol = inbound.protocol(),
            users = inbound.user_count(),
            "Inbound configured"
        );
        Ok(inbound)
    }
}

fn provision<P, C, F>(handler: &Handler<P>, clients: &[C], to_user: F) -> Result<(), InboundError>
where
    P: InboundProtocol,
    F: Fn(&C) -> Result<User<P::Account>, InboundError>,
{
    for client in clients {
        handler.validator().add(to_user(client)?)?;
    }
    Ok(())
}

/// A handler of any supported protocol.
#[derive(Debug, Clone)]
pub enum AnyInbound {
    /// Trojan handler.
    Trojan(Arc<TrojanInbound>),
    /// VLESS handler.
    Vless(Arc<VlessInbound>),
    /// VMess handler.
    Vmess(Arc<VmessInbound>),
    /// Shadowsocks handler.
    Shadowsocks(Arc<ShadowsocksInbound>),
}

impl AnyInbound {
    /// Handler tag.
    pub fn tag(&self) -> &str {
        match self {
            Self::Trojan(h) => h.tag(),
            Self::Vless(h) => h.tag(),
            Self::Vmess(h) => h.tag(),
            Self::Shadowsocks(h) => h.tag(),
        }
    }

    /// Protocol name.
    pub fn protocol(&self) -> &'static str {
        match self {
            Self::Trojan(h) => h.protocol(),
            Self::Vless(h) => h.protocol(),
            Self::Vmess(h) => h.protocol(),
            Self::Shadowsocks(h) => h.protocol(),
        }
    }

    /// Number of labeled users.
    pub fn user_count(&self) -> usize {
        match self {
            Self::Trojan(h) => h.validator().get_count(),
            Self::Vless(h) => h.validator().get_count(),
            Self::Vmess(h) => h.validator().get_count(),
            Self::Shadowsocks(h) => h.validator().get_count(),
        }
    }

    /// Emails of every labeled user.
    pub fn user_emails(&self) -> Vec<String> {
        match self {
            Self::Trojan(h) => h.validator().get_all_labels(),
            Self::Vless(h) => h.validator().get_all_labels(),
            Self::Vmess(h) => h.validator().get_all_labels(),
            Self::Shadowsocks(h) => h.validator().get_all_labels(),
        }
    }

    /// Revokes a user by email.
    pub fn remove_user(&self, email: &str) -> Result<(), InboundError> {
        match self {
            Self::Trojan(h) => h.validator().del(email)?,
            Self::Vless(h) => h.validator().del(email)?,
            Self::Vmess(h) => h.validator().del(email)?,
            Self::Shadowsocks(h) => h.validator().del(email)?,
        }
        Ok(())
    }
}

/// All configured inbound handlers.
#[derive(Debug, Clone, Default)]
pub struct InboundSet {
    inbounds: Vec<AnyInbound>,
}

impl InboundSet {
    /// Finds a handler by tag.
    pub fn get(&self, tag: &str) -> Option<&AnyInbound> {
        self.inbounds.iter().find(|inbound| inbound.tag() == tag)
    }

    /// Iterates over all handlers.
    pub fn iter(&self) -> impl Iterator<Item = &AnyInbound> {
        self.inbounds.iter()
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.inbounds.len()
    }

    /// Returns `true` if no handlers are configured.
    pub fn is_empty(&self) -> bool {
        self.inbounds.is_empty()
    }
}
