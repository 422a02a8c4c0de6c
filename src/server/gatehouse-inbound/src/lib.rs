//! # Gatehouse Inbound
//!
//! Protocol inbound handlers and their configuration.
//!
//! ## Protocols
//!
//! - Trojan (SHA-224 hashed password)
//! - VLESS (UUID)
//! - VMess (UUID)
//! - Shadowsocks (SHA-256 hashed password)
//!
//! Every handler owns one credential [`Validator`](gatehouse_auth::Validator)
//! and one callback manager. Accepting a connection authenticates the
//! presented token, then runs the on-process and on-process-start hooks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handler;
pub mod shadowsocks;
pub mod trojan;
pub mod vless;
pub mod vmess;

pub use config::{AnyInbound, InboundConfig, InboundSet, ServerConfig};
pub use error::InboundError;
pub use handler::{Handler, InboundProtocol, Session};
pub use shadowsocks::{Shadowsocks, ShadowsocksAccount, ShadowsocksInbound};
pub use trojan::{Trojan, TrojanAccount, TrojanInbound};
pub use vless::{Vless, VlessAccount, VlessInbound};
pub use vmess::{Vmess, VmessAccount, VmessInbound};
