//! Inbound error types.

use gatehouse_auth::AuthError;
use gatehouse_hooks::HookFailure;
use thiserror::Error;

/// Errors raised while accepting connections or building inbounds.
#[derive(Debug, Error)]
pub enum InboundError {
    /// The presented credential does not belong to a known user.
    #[error("invalid user")]
    Unauthorized,

    /// A lifecycle hook rejected the connection.
    #[error(transparent)]
    Hook(#[from] HookFailure),

    /// User provisioning failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid inbound configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
