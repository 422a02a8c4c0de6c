//! Hook error types.

use thiserror::Error;

use crate::HookId;

/// Error produced by a hook. Opaque to the callback manager.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A hook rejected the context it was given.
///
/// Carries the id of the failing hook and its error, unchanged.
#[derive(Debug, Error)]
#[error("hook {id} failed: {source}")]
pub struct HookFailure {
    /// Id of the hook that failed.
    pub id: HookId,
    /// Error returned by the hook.
    #[source]
    pub source: HookError,
}

impl HookFailure {
    /// Returns the hook's error, consuming the failure.
    pub fn into_source(self) -> HookError {
        self.source
    }
}
