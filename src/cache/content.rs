//! Pluggable file-content cache.
//!
//! # Contract
//!
//! ```text
//! VirtualPath::read_text()
//! ├── read_if_present(key) ── hit ──► cached text (no disk access)
//! └── miss ──► read file ──► write(key, text) ──► text
//! ```
//!
//! Keys are normalized path strings (see [`VirtualPath::as_str`]).
//! Backends hold no caching policy of their own: the caller decides what
//! gets written. A backend that fails internally must behave as a miss.
//!
//! [`VirtualPath::as_str`]: crate::file::VirtualPath::as_str

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

// =============================================================================
// ContentCache Trait
// =============================================================================

/// Key-value store for decoded file contents.
///
/// # Thread Safety
///
/// The cache is shared by every worker thread. Implementations must tolerate
/// concurrent reads and concurrent write-after-miss for the same key; last
/// write wins.
pub trait ContentCache: Send + Sync {
    /// Return the cached content for `key`, if any.
    fn read_if_present(&self, key: &str) -> Option<Arc<str>>;

    /// Store `content` under `key`.
    fn write(&self, key: &str, content: Arc<str>);
}

impl<C: ContentCache + ?Sized> ContentCache for Arc<C> {
    fn read_if_present(&self, key: &str) -> Option<Arc<str>> {
        (**self).read_if_present(key)
    }

    fn write(&self, key: &str, content: Arc<str>) {
        (**self).write(key, content);
    }
}

// =============================================================================
// NoContentCache - Disabled Backend
// =============================================================================

/// Always-miss, never-store backend.
///
/// Used when caching is disabled in [`Config`](crate::config::Config).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContentCache;

impl ContentCache for NoContentCache {
    fn read_if_present(&self, _key: &str) -> Option<Arc<str>> {
        None
    }

    fn write(&self, _key: &str, _content: Arc<str>) {}
}

// =============================================================================
// MemoryContentCache - In-Memory Backend
// =============================================================================

/// Unbounded in-memory backend.
///
/// # Example
///
/// ```
/// use virtual_serve::cache::{ContentCache, MemoryContentCache};
///
/// let cache = MemoryContentCache::new();
/// cache.write("index.html", "<h1>hi</h1>".into());
/// assert_eq!(cache.read_if_present("index.html").as_deref(), Some("<h1>hi</h1>"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryContentCache {
    entries: RwLock<FxHashMap<String, Arc<str>>>,
}

impl MemoryContentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop a single entry, returning it.
    pub fn remove(&self, key: &str) -> Option<Arc<str>> {
        self.entries.write().remove(key)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl ContentCache for MemoryContentCache {
    fn read_if_present(&self, key: &str) -> Option<Arc<str>> {
        self.entries.read().get(key).cloned()
    }

    fn write(&self, key: &str, content: Arc<str>) {
        self.entries.write().insert(key.to_owned(), content);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cache_never_stores() {
        let cache = NoContentCache;
        cache.write("a.txt", "content".into());
        assert!(cache.read_if_present("a.txt").is_none());
    }

    #[test]
    fn test_memory_cache_last_write_wins() {
        let cache = MemoryContentCache::new();
        cache.write("a.txt", "first".into());
        cache.write("a.txt", "second".into());
        assert_eq!(cache.read_if_present("a.txt").as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_memory_cache_remove_and_clear() {
        let cache = MemoryContentCache::new();
        cache.write("a.txt", "a".into());
        cache.write("b.txt", "b".into());
        assert_eq!(cache.remove("a.txt").as_deref(), Some("a"));
        assert!(cache.read_if_present("a.txt").is_none());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_writes_same_key() {
        let cache = MemoryContentCache::new();
        std::thread::scope(|s| {
            for i in 0..8 {
                let cache = &cache;
                s.spawn(move || {
                    for _ in 0..100 {
                        cache.write("shared", Arc::from(format!("v{i}")));
                        assert!(cache.read_if_present("shared").is_some());
                    }
                });
            }
        });
        assert_eq!(cache.len(), 1);
        assert!(cache.read_if_present("shared").unwrap().starts_with('v'));
    }

    #[test]
    fn test_arc_forwarding() {
        let inner = Arc::new(MemoryContentCache::new());
        let shared: Arc<dyn ContentCache> = inner.clone();
        shared.write("k", "v".into());
        assert_eq!(inner.len(), 1);
    }
}
