//! Contexts handed to lifecycle hooks.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Descriptor of an in-flight inbound connection.
///
/// Passed to on-process hooks, which may inspect it or annotate it through
/// [`attributes`](Self::attributes).
#[derive(Debug, Clone)]
pub struct Inbound {
    /// Tag of the inbound handler that accepted the connection.
    pub tag: String,
    /// Protocol name (e.g. "trojan", "vless").
    pub protocol: &'static str,
    /// Remote address of the client.
    pub source: SocketAddr,
    /// Email of the authenticated user (empty for anonymous users).
    pub email: String,
    /// Level of the authenticated user.
    pub level: u32,
    /// Free-form annotations set by hooks.
    pub attributes: HashMap<String, String>,
}

impl Inbound {
    /// Creates a descriptor for a connection accepted by `tag`.
    pub fn new(tag: impl Into<String>, protocol: &'static str, source: SocketAddr) -> Self {
        Self {
            tag: tag.into(),
            protocol,
            source,
            email: String::new(),
            level: 0,
            attributes: HashMap::new(),
        }
    }

    /// Records the authenticated user on the descriptor.
    pub fn with_user(mut self, email: impl Into<String>, level: u32) -> Self {
        self.email = email.into();
        self.level = level;
        self
    }

    /// Sets an annotation, returning the previous value.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.attributes.insert(key.into(), value.into())
    }

    /// Returns an annotation by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Per-connection session policy.
///
/// Passed to on-process-start hooks before it takes effect; hooks may tighten
/// or relax it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicy {
    /// Time allowed to complete the protocol handshake.
    #[serde(with = "secs")]
    pub handshake: Duration,
    /// Idle time after which the connection is closed.
    #[serde(with = "secs")]
    pub conn_idle: Duration,
    /// Time to keep the connection after the downlink closed.
    #[serde(with = "secs")]
    pub uplink_only: Duration,
    /// Time to keep the connection after the uplink closed.
    #[serde(with = "secs")]
    pub downlink_only: Duration,
    /// Per-connection buffer size in bytes.
    pub buffer_size: u32,
    /// Count uplink traffic per user.
    pub stats_user_uplink: bool,
    /// Count downlink traffic per user.
    pub stats_user_downlink: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            handshake: Duration::from_secs(4),
            conn_idle: Duration::from_secs(300),
            uplink_only: Duration::from_secs(1),
            downlink_only: Duration::from_secs(1),
            buffer_size: 512 * 1024,
            stats_user_uplink: false,
            stats_user_downlink: false,
        }
    }
}

/// Session policies keyed by user level.
///
/// Levels without an entry get [`SessionPolicy::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyLevels {
    levels: HashMap<u32, SessionPolicy>,
}

impl PolicyLevels {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for a level.
    pub fn insert(&mut self, level: u32, policy: SessionPolicy) {
        self.levels.insert(level, policy);
    }

    /// Returns a fresh policy for `level`.
    pub fn for_level(&self, level: u32) -> SessionPolicy {
        self.levels.get(&level).cloned().unwrap_or_default()
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
