//! Per-event hook chains.

use std::fmt;
use std::sync::Arc;

use gatehouse_registry::IdRegistry;
use tracing::debug;

use crate::error::{HookError, HookFailure};

/// Identifier assigned to a hook when it is registered.
pub type HookId = u64;

/// A hook for one lifecycle event.
///
/// Hooks receive mutable access to the event context and may annotate it, or
/// reject it by returning an error.
pub type Hook<Ctx> = Arc<dyn Fn(&mut Ctx) -> Result<(), HookError> + Send + Sync>;

/// The hooks registered for a single lifecycle event.
pub struct Callbacks<Ctx> {
    hooks: IdRegistry<HookId, Hook<Ctx>>,
}

impl<Ctx> Callbacks<Ctx> {
    /// Creates an empty hook chain.
    pub fn new() -> Self {
        Self {
            hooks: IdRegistry::new(),
        }
    }

    /// Registers a hook and returns its id.
    pub fn add<F>(&self, hook: F) -> HookId
    where
        F: Fn(&mut Ctx) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.add(Arc::new(hook))
    }

    /// Registers an already shared hook.
    pub fn add_shared(&self, hook: Hook<Ctx>) -> HookId {
        self.hooks.add(hook)
    }

    /// Unregisters a hook. Unknown ids are ignored.
    pub fn rm(&self, id: HookId) {
        self.hooks.rm(id);
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every registered hook against `ctx`.
    ///
    /// Hooks run over a snapshot taken at call time, in unspecified order.
    /// Hooks added or removed while this call is running take effect on the
    /// next call.
    ///
    /// # Returns
    ///
    /// * `Ok(id)` - id of the last hook run, or `0` if none were registered
    /// * `Err(HookFailure)` - the first hook that failed; the rest are skipped
    pub fn exec(&self, ctx: &mut Ctx) -> Result<HookId, HookFailure> {
        let mut last = HookId::default();
        for (id, hook) in self.hooks.get_all() {
            last = id;
            if let Err(source) = hook(ctx) {
                debug!(hook_id = id, error = %source, "Hook rejected context");
                return Err(HookFailure { id, source });
            }
        }
        Ok(last)
    }
}

impl<Ctx> Default for Callbacks<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> fmt::Debug for Callbacks<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
