//! Callback managers owned by protocol inbound handlers.

use crate::callbacks::{Callbacks, HookId};
use crate::context::{Inbound, SessionPolicy};
use crate::error::HookFailure;

/// Lifecycle checkpoints a protocol handler drives during connection setup.
///
/// Implemented by every callback manager so handlers can stay generic over
/// which events their protocol exposes.
pub trait LifecycleHooks: Send + Sync {
    /// Runs the on-process hooks against the inbound descriptor.
    fn exec_on_process(&self, inbound: &mut Inbound) -> Result<HookId, HookFailure>;

    /// Runs the on-process-start hooks against the session policy.
    ///
    /// Managers without this event report success with id `0`.
    fn exec_on_process_start(&self, _policy: &mut SessionPolicy) -> Result<HookId, HookFailure> {
        Ok(HookId::default())
    }
}

/// Callback manager for inbounds exposing both lifecycle events.
#[derive(Debug, Default)]
pub struct InboundCallbackManager {
    /// Hooks run before payload processing.
    pub on_process: Callbacks<Inbound>,
    /// Hooks run before the session policy becomes active.
    pub on_process_start: Callbacks<SessionPolicy>,
}

impl InboundCallbackManager {
    /// Creates a manager with no hooks registered.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LifecycleHooks for InboundCallbackManager {
    fn exec_on_process(&self, inbound: &mut Inbound) -> Result<HookId, HookFailure> {
        self.on_process.exec(inbound)
    }

    fn exec_on_process_start(&self, policy: &mut SessionPolicy) -> Result<HookId, HookFailure> {
        self.on_process_start.exec(policy)
    }
}

/// Callback manager for servers exposing only the on-process event.
#[derive(Debug, Default)]
pub struct ServerCallbackManager {
    /// Hooks run before payload processing.
    pub on_process: Callbacks<Inbound>,
}

impl ServerCallbackManager {
    /// Creates a manager with no hooks registered.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LifecycleHooks for ServerCallbackManager {
    fn exec_on_process(&self, inbound: &mut Inbound) -> Result<HookId, HookFailure> {
        self.on_process.exec(inbound)
    }
}
