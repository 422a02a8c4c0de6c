//! Protocol-independent inbound handler.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use gatehouse_auth::{Account, Credential, Validator};
use gatehouse_hooks::{Inbound, LifecycleHooks, PolicyLevels, SessionPolicy};
use tracing::{debug, info};

use crate::error::InboundError;

/// Token type of a protocol's accounts.
pub type TokenOf<P> = <<P as InboundProtocol>::Account as Account>::Token;

/// Ties a protocol to its account type and callback manager.
pub trait InboundProtocol: Send + Sync + 'static {
    /// Protocol name reported to hooks.
    const NAME: &'static str;

    /// Account stored for each user.
    type Account: Account;

    /// Callback manager exposing the protocol's lifecycle events.
    type Hooks: LifecycleHooks + Default + fmt::Debug;

    /// Extracts the token from the credential bytes sent by a client.
    ///
    /// Returns `None` when the bytes are malformed.
    fn parse_presented(presented: &[u8]) -> Option<TokenOf<Self>>;
}

/// An authenticated connection that passed every lifecycle hook.
#[derive(Debug)]
pub struct Session<A: Account> {
    /// The authenticated user.
    pub credential: Arc<Credential<A>>,
    /// Inbound descriptor as left by the on-process hooks.
    pub inbound: Inbound,
    /// Session policy as left by the on-process-start hooks.
    pub policy: SessionPolicy,
}

/// Inbound handler for protocol `P`.
///
/// Owns the protocol's user validator and callback manager.
pub struct Handler<P: InboundProtocol> {
    tag: String,
    validator: Validator<P::Account>,
    callbacks: P::Hooks,
    policy: PolicyLevels,
}

impl<P: InboundProtocol> Handler<P> {
    /// Creates a handler with no users and no hooks.
    pub fn new(tag: impl Into<String>, policy: PolicyLevels) -> Self {
        let tag = tag.into();
        info!(tag = %tag, protocol = P::NAME, "Inbound handler created");
        Self {
            tag,
            validator: Validator::new(),
            callbacks: P::Hooks::default(),
            policy,
        }
    }

    /// Handler tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Protocol name.
    pub fn protocol(&self) -> &'static str {
        P::NAME
    }

    /// User validator, for provisioning and revocation.
    pub fn validator(&self) -> &Validator<P::Account> {
        &self.validator
    }

    /// Callback manager, for registering hooks.
    pub fn callbacks(&self) -> &P::Hooks {
        &self.callbacks
    }

    /// Finds a user by email or by token text.
    pub fn lookup(&self, identifier: &str) -> Option<Arc<Credential<P::Account>>> {
        self.validator.load(identifier)
    }

    /// Accepts a connection presenting the raw credential bytes.
    ///
    /// # Errors
    ///
    /// Malformed bytes are rejected as [`InboundError::Unauthorized`]; see
    /// [`accept`](Self::accept) for the rest.
    pub fn accept_presented(
        &self,
        presented: &[u8],
        source: SocketAddr,
    ) -> Result<Session<P::Account>, InboundError> {
        let token = P::parse_presented(presented).ok_or_else(|| {
            debug!(tag = %self.tag, source = %source, "Malformed credential");
            InboundError::Unauthorized
        })?;
        self.accept(&token, source)
    }

    /// Authenticates `token` and runs the lifecycle hooks.
    ///
    /// # Errors
    ///
    /// * [`InboundError::Unauthorized`] - no user holds `token`
    /// * [`InboundError::Hook`] - an on-process or on-process-start hook failed
    pub fn accept(
        &self,
        token: &TokenOf<P>,
        source: SocketAddr,
    ) -> Result<Session<P::Account>, InboundError> {
        let credential = self.validator.get(token).ok_or_else(|| {
            debug!(tag = %self.tag, source = %source, "Unknown user");
            InboundError::Unauthorized
        })?;

        let mut inbound = Inbound::new(self.tag.as_str(), P::NAME, source)
            .with_user(credential.label(), credential.level());
        self.callbacks.exec_on_process(&mut inbound)?;

        let mut policy = self.policy.for_level(credential.level());
        self.callbacks.exec_on_process_start(&mut policy)?;

        debug!(
            tag = %self.tag,
            email = credential.label(),
            source = %source,
            "Connection accepted"
        );
        Ok(Session {
            credential,
            inbound,
            policy,
        })
    }
}

impl<P: InboundProtocol> fmt::Debug for Handler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("tag", &self.tag)
            .field("protocol", &P::NAME)
            .field("validator", &self.validator)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
