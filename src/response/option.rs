//! Interned header names.
//!
//! # Registry
//!
//! ```text
//! HeaderRegistry (one per server instance, Arc-shared)
//! └── FxHashMap<lowercase name, HeaderOption>
//!     ├── "content-type" ──► HeaderOption { id: 15, "Content-Type" }
//!     └── "x-test"       ──► HeaderOption { id: 34, "X-Test" }   (runtime)
//! ```
//!
//! Standard response headers are seeded at construction so their ids match
//! [`StandardHeader`] discriminants. Entries are never removed.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::Config;

// =============================================================================
// HeaderOption
// =============================================================================

/// A canonical, interned header name.
///
/// Cheap to clone. Two options are equal iff their case-insensitive names
/// are equal; options handed out by the same [`HeaderRegistry`] for the same
/// name are the same instance.
#[derive(Clone)]
pub struct HeaderOption {
    inner: Arc<OptionInner>,
}

struct OptionInner {
    id: u32,
    name: Box<str>,
    key: Box<str>,
    cache_applicable: bool,
}

impl HeaderOption {
    fn new(id: u32, name: &str, key: Box<str>, cache_applicable: bool) -> Self {
        Self {
            inner: Arc::new(OptionInner {
                id,
                name: name.into(),
                key,
                cache_applicable,
            }),
        }
    }

    /// The name as first registered (e.g. `"Content-Type"`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The case-normalized lookup key (e.g. `"content-type"`).
    #[inline]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Registry-local small integer id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.inner.id
    }

    /// Whether values of this header may be replayed unchanged from a
    /// cached response.
    #[inline]
    pub fn is_cache_applicable(&self) -> bool {
        self.inner.cache_applicable
    }

    /// ASCII bytes of the name, as written on the wire.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.name.as_bytes()
    }

    /// Whether both handles point at the same registered instance.
    #[inline]
    pub fn same_instance(&self, other: &HeaderOption) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for HeaderOption {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other) || self.inner.key == other.inner.key
    }
}

impl Eq for HeaderOption {}

impl Hash for HeaderOption {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.key.hash(state);
    }
}

impl fmt::Display for HeaderOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

impl fmt::Debug for HeaderOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeaderOption").field(&self.inner.name).finish()
    }
}

// =============================================================================
// StandardHeader
// =============================================================================

macro_rules! standard_headers {
    (@cache) => { true };
    (@cache $cache:literal) => { $cache };
    ($($(#[$doc:meta])* $variant:ident => $name:literal $(, cache = $cache:literal)?;)*) => {
        /// Response headers known to every [`HeaderRegistry`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StandardHeader {
            $($(#[$doc])* $variant,)*
        }

        impl StandardHeader {
            /// Every standard header, in id order.
            pub const ALL: &'static [StandardHeader] = &[$(StandardHeader::$variant,)*];

            /// The canonical header name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(StandardHeader::$variant => $name,)*
                }
            }

            /// Whether the header may be replayed from a cached response.
            pub const fn is_cache_applicable(self) -> bool {
                match self {
                    $(StandardHeader::$variant => standard_headers!(@cache $($cache)?),)*
                }
            }
        }
    };
}

standard_headers! {
    /// Which origins may participate in cross-origin resource sharing.
    AccessControlAllowOrigin => "Access-Control-Allow-Origin";
    /// Supported patch document formats.
    AcceptPatch => "Accept-Patch";
    /// Supported partial content range types.
    AcceptRanges => "Accept-Ranges";
    /// Seconds the object has been in a proxy cache.
    Age => "Age", cache = false;
    /// Valid methods for a resource (405 responses).
    Allow => "Allow";
    /// Caching directives for every cache between server and client.
    CacheControl => "Cache-Control";
    /// Connection options and hop-by-hop fields.
    Connection => "Connection";
    /// Encoding applied to the body.
    ContentEncoding => "Content-Encoding";
    /// Natural language of the intended audience.
    ContentLanguage => "Content-Language";
    /// Transfer encoding of the body.
    ContentTransferEncoding => "Content-Transfer-Encoding";
    /// Download dialog / suggested file name.
    ContentDisposition => "Content-Disposition";
    /// Redirect target or location of a created resource.
    Location => "Location";
    /// Base64 MD5 of the body.
    ContentMd5 => "Content-MD5";
    /// Where a partial body belongs in the full message.
    ContentRange => "Content-Range";
    /// Server implementation banner.
    XPoweredBy => "X-Powered-By";
    /// MIME type of the body.
    ContentType => "Content-Type";
    /// CGI-style status field.
    Status => "Status";
    /// Time the message was sent (HTTP-date).
    Date => "Date", cache = false;
    /// Version identifier of the resource.
    ETag => "ETag";
    /// Server name.
    Server => "Server";
    /// Time after which the response is stale (HTTP-date).
    Expires => "Expires";
    /// Last modification time of the resource (HTTP-date).
    LastModified => "Last-Modified";
    /// Typed relation to another resource.
    Link => "Link";
    /// Body length in octets.
    ContentLength => "Content-Length";
    /// Implementation-specific directives.
    Pragma => "Pragma";
    /// Authentication challenge.
    WwwAuthenticate => "WWW-Authenticate";
    /// Proxy authentication challenge.
    ProxyAuthenticate => "Proxy-Authenticate";
    /// Pinned public key hashes.
    PublicKeyPins => "Public-Key-Pins";
    /// Redirect after a delay.
    Refresh => "Refresh";
    /// Cookies for the client.
    SetCookie => "Set-Cookie", cache = false;
    /// When to retry an unavailable resource.
    RetryAfter => "Retry-After";
    /// MIME sniffing policy.
    XContentTypeOptions => "X-Content-Type-Options";
    /// Framing policy.
    XFrameOptions => "X-Frame-Options";
    /// Content security policy.
    ContentSecurityPolicy => "Content-Security-Policy";
}

// =============================================================================
// HeaderRegistry
// =============================================================================

/// Registry of canonical [`HeaderOption`]s.
///
/// # Example
///
/// ```
/// use virtual_serve::response::{HeaderRegistry, StandardHeader};
///
/// let registry = HeaderRegistry::new();
/// let a = registry.get_or_create("X-Test");
/// let b = registry.get_or_create("x-test");
/// assert!(a.same_instance(&b));
/// assert_eq!(registry.get("content-type"), Some(registry.standard(StandardHeader::ContentType)));
/// ```
pub struct HeaderRegistry {
    options: RwLock<FxHashMap<Box<str>, HeaderOption>>,
    standard: Vec<HeaderOption>,
    next_id: AtomicU32,
    debug: bool,
}

impl HeaderRegistry {
    /// Create a registry seeded with the standard headers.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a registry honoring `config.debug`.
    pub fn with_config(config: &Config) -> Self {
        let mut options = FxHashMap::default();
        let mut standard = Vec::with_capacity(StandardHeader::ALL.len());
        for (id, header) in StandardHeader::ALL.iter().enumerate() {
            let key = canonical_key(header.name());
            let option = HeaderOption::new(
                id as u32,
                header.name(),
                key.clone(),
                header.is_cache_applicable(),
            );
            options.insert(key, option.clone());
            standard.push(option);
        }

        Self {
            options: RwLock::new(options),
            next_id: AtomicU32::new(standard.len() as u32),
            standard,
            debug: config.debug,
        }
    }

    /// Create a shared registry.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// The seeded instance of a standard header.
    #[inline]
    pub fn standard(&self, header: StandardHeader) -> HeaderOption {
        self.standard[header as usize].clone()
    }

    /// Look up a header without creating it.
    pub fn get(&self, name: &str) -> Option<HeaderOption> {
        self.options.read().get(&*canonical_key(name)).cloned()
    }

    /// Return the canonical option for `name`, registering it if unknown.
    ///
    /// Runtime-registered headers are cache-applicable.
    pub fn get_or_create(&self, name: &str) -> HeaderOption {
        let key = canonical_key(name);
        if let Some(option) = self.options.read().get(&key) {
            return option.clone();
        }

        let mut options = self.options.write();
        options
            .entry(key)
            .or_insert_with_key(|key| {
                if self.debug {
                    tracing::debug!(header = name, "registering unknown header");
                }
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                HeaderOption::new(id, name, key.clone(), true)
            })
            .clone()
    }

    /// Register `name` with an explicit cache-applicable flag.
    ///
    /// Replaces any existing entry for the same name; the id is kept.
    /// Options handed out earlier stay equal to the new one.
    pub fn create(&self, name: &str, cache_applicable: bool) -> HeaderOption {
        let key = canonical_key(name);
        let mut options = self.options.write();
        let id = options
            .get(&key)
            .map(HeaderOption::id)
            .unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::Relaxed));
        let option = HeaderOption::new(id, name, key.clone(), cache_applicable);
        options.insert(key, option.clone());
        option
    }

    /// Number of registered header names.
    pub fn len(&self) -> usize {
        self.options.read().len()
    }

    /// Always `false`: the standard headers are seeded at construction.
    pub fn is_empty(&self) -> bool {
        self.options.read().is_empty()
    }

    /// Whether per-request debug events are enabled.
    #[inline]
    pub fn debug(&self) -> bool {
        self.debug
    }
}

impl Default for HeaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderRegistry")
            .field("len", &self.len())
            .field("debug", &self.debug)
            .finish()
    }
}

fn canonical_key(name: &str) -> Box<str> {
    name.trim().to_ascii_lowercase().into_boxed_str()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_get_or_create_same_instance() {
        let registry = HeaderRegistry::new();
        let a = registry.get_or_create("X-Test");
        let b = registry.get_or_create("X-Test");
        let c = registry.get_or_create("x-test");

        assert!(a.same_instance(&b));
        assert!(a.same_instance(&c));
        assert_eq!(c.name(), "X-Test");
        assert_eq!(c.key(), "x-test");
    }

    #[test]
    fn test_standard_headers_seeded() {
        let registry = HeaderRegistry::new();
        assert_eq!(registry.len(), StandardHeader::ALL.len());

        let content_type = registry.standard(StandardHeader::ContentType);
        assert_eq!(content_type.name(), "Content-Type");
        assert_eq!(content_type.id(), StandardHeader::ContentType as u32);
        assert!(content_type.same_instance(&registry.get_or_create("CONTENT-TYPE")));
    }

    #[test]
    fn test_cache_applicable_flags() {
        let registry = HeaderRegistry::new();
        assert!(!registry.standard(StandardHeader::SetCookie).is_cache_applicable());
        assert!(!registry.standard(StandardHeader::Date).is_cache_applicable());
        assert!(registry.standard(StandardHeader::ETag).is_cache_applicable());
        assert!(registry.get_or_create("X-Custom").is_cache_applicable());
    }

    #[test]
    fn test_runtime_ids_are_unique() {
        let registry = HeaderRegistry::new();
        let a = registry.get_or_create("X-One");
        let b = registry.get_or_create("X-Two");
        assert_ne!(a.id(), b.id());
        assert!(a.id() >= StandardHeader::ALL.len() as u32);
    }

    #[test]
    fn test_create_overrides_flag_keeps_equality() {
        let registry = HeaderRegistry::new();
        let before = registry.get_or_create("X-Session");
        let after = registry.create("X-Session", false);

        assert_eq!(before, after);
        assert_eq!(before.id(), after.id());
        assert!(!after.is_cache_applicable());
        assert!(registry.get("x-session").unwrap().same_instance(&after));
    }

    #[test]
    fn test_equality_and_hash_by_name() {
        let first = HeaderRegistry::new();
        let second = HeaderRegistry::new();
        let a = first.get_or_create("X-Test");
        let b = second.get_or_create("x-TEST");

        assert!(!a.same_instance(&b));
        assert_eq!(a, b);
        let set: HashSet<HeaderOption> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_concurrent_get_or_create() {
        let registry = HeaderRegistry::new();
        let options: Vec<HeaderOption> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| registry.get_or_create("X-Race")))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(options.iter().all(|o| o.same_instance(&options[0])));
        assert_eq!(registry.len(), StandardHeader::ALL.len() + 1);
    }

    #[test]
    fn test_get_unknown() {
        let registry = HeaderRegistry::new();
        assert!(registry.get("X-Nope").is_none());
    }
}
