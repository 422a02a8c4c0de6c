//! # Gatehouse Registry
//!
//! Thread-safe registry mapping generated integer ids to items.
//!
//! Ids are handed out by the registry itself, starting at zero and
//! incrementing by one per insertion. An id is never handed out twice by the
//! same registry, even after the item it named has been removed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod id;

use std::collections::HashMap;

use parking_lot::RwLock;

pub use id::RegistryId;

/// Interior state guarded by a single lock so the counter and the map move
/// together.
struct Inner<Id, T> {
    data: HashMap<Id, T>,
    next_id: Id,
}

/// A concurrent registry of items keyed by generated ids.
///
/// All operations may be called concurrently from any number of threads.
/// [`get_all`](Self::get_all) returns an independent snapshot whose iteration
/// order is unspecified.
pub struct IdRegistry<Id, T> {
    inner: RwLock<Inner<Id, T>>,
}

impl<Id: RegistryId, T: Clone> IdRegistry<Id, T> {
    /// Creates an empty registry whose first id is zero.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                data: HashMap::new(),
                next_id: Id::default(),
            }),
        }
    }

    /// Stores `item` and returns the id assigned to it.
    pub fn add(&self, item: T) -> Id {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id = id.next();
        inner.data.insert(id, item);
        id
    }

    /// Removes the item stored under `id`.
    ///
    /// Removing an id that is not present is a no-op.
    pub fn rm(&self, id: Id) {
        self.inner.write().data.remove(&id);
    }

    /// Returns a point-in-time copy of every entry.
    pub fn get_all(&self) -> HashMap<Id, T> {
        self.inner.read().data.clone()
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    /// Returns `true` if no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<Id: RegistryId, T: Clone> Default for IdRegistry<Id, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: RegistryId, T> std::fmt::Debug for IdRegistry<Id, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("IdRegistry")
            .field("len", &inner.data.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}
