//! Response snapshots keyed by request target.
//!
//! Each key owns a slot guarded by its own mutex, so the first snapshot for
//! a key is built by exactly one caller while other keys proceed in
//! parallel. Concurrent callers for the same key wait and then share the
//! result.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use super::response::CachedResponse;
use crate::error::SnapshotError;
use crate::response::ResponseBody;

type Slot = Arc<Mutex<Option<Arc<CachedResponse>>>>;

/// Concurrent map from request target to [`CachedResponse`].
///
/// Keys share the normalized path format used by
/// [`ContentCache`](super::ContentCache).
#[derive(Debug, Default)]
pub struct ResponseCache {
    slots: RwLock<FxHashMap<String, Slot>>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot stored under `key`, if built.
    pub fn get(&self, key: &str) -> Option<Arc<CachedResponse>> {
        let slot = self.slots.read().get(key).cloned()?;
        slot.lock().clone()
    }

    /// Return the snapshot for `key`, building it with `build` on first use.
    ///
    /// `build` runs at most once per key at a time. If it fails, nothing is
    /// stored and the next caller retries. If the key is removed or the
    /// cache cleared while `build` runs, the snapshot is returned but not
    /// stored, and the next caller builds again.
    ///
    /// `build` must not call [`remove`](Self::remove) for the same key.
    pub fn get_or_try_insert_with<B, E, F>(&self, key: &str, build: F) -> Result<Arc<CachedResponse>, E>
    where
        B: ResponseBody,
        E: From<SnapshotError>,
        F: FnOnce() -> Result<B, E>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock();
        if let Some(snapshot) = guard.as_ref() {
            tracing::trace!(key, "response cache hit");
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = Arc::new(CachedResponse::new(build()?)?);
        if !self.is_registered(key, &slot) {
            tracing::debug!(key, id = %snapshot.id(), "slot evicted during build, not cached");
            return Ok(snapshot);
        }
        tracing::debug!(key, id = %snapshot.id(), "response cached");
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Store `snapshot` under `key`, returning the previous one.
    pub fn insert(&self, key: &str, snapshot: Arc<CachedResponse>) -> Option<Arc<CachedResponse>> {
        self.slot(key).lock().replace(snapshot)
    }

    /// Drop the snapshot under `key`.
    pub fn remove(&self, key: &str) -> Option<Arc<CachedResponse>> {
        let slot = self.slots.write().remove(key)?;
        slot.lock().take()
    }

    /// Drop every snapshot.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Number of keys with a slot (built or being built).
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether no key has a slot.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    fn is_registered(&self, key: &str, slot: &Slot) -> bool {
        self.slots
            .read()
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    fn slot(&self, key: &str) -> Slot {
        if let Some(slot) = self.slots.read().get(key) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(key.to_owned()).or_default())
    }
}

// =============================================================================
// Tests
// =============================================================================
