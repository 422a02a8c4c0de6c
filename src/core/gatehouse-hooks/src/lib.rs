//! # Gatehouse Hooks
//!
//! Extension points for inbound connection handling.
//!
//! ## Lifecycle events
//!
//! - **on-process**: runs right before protocol payload processing begins,
//!   with the connection's [`Inbound`] descriptor
//! - **on-process-start**: runs before a per-connection [`SessionPolicy`]
//!   becomes active
//!
//! Hooks registered for an event run over a snapshot in unspecified order.
//! The first failing hook aborts the chain.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod callbacks;
pub mod context;
pub mod error;
pub mod manager;

pub use callbacks::{Callbacks, Hook, HookId};
pub use context::{Inbound, PolicyLevels, SessionPolicy};
pub use error::{HookError, HookFailure};
pub use manager::{InboundCallbackManager, LifecycleHooks, ServerCallbackManager};
