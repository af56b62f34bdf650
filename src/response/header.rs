//! Response metadata: status line, protocol and an ordered multimap of
//! header values.

use std::fmt;
use std::sync::Arc;

use super::cookie::ResponseCookie;
use super::option::{HeaderOption, HeaderRegistry, StandardHeader};
use super::status::{HTTP_1_1, STATUS_OK, STATUS_TEMPORARY_REDIRECT};
use super::time::http_date_now;

/// Status line, protocol version and header values of one response.
///
/// Values are kept in insertion order. A `Header` belongs to a single
/// in-flight response and is mutated only by its producer; it is `Send`
/// but carries no internal locking.
///
/// # Example
///
/// ```
/// use virtual_serve::response::{Header, HeaderRegistry, StandardHeader, STATUS_OK};
///
/// let registry = HeaderRegistry::shared();
/// let content_type = registry.standard(StandardHeader::ContentType);
///
/// let mut header = Header::new(STATUS_OK, registry);
/// header.set(&content_type, "text/plain").set(&content_type, "text/html");
/// assert_eq!(header.get(&content_type), Some("text/html"));
/// assert_eq!(header.get_multiple(&content_type).len(), 1);
/// ```
#[derive(Clone)]
pub struct Header {
    status: String,
    format: String,
    entries: Vec<(HeaderOption, String)>,
    registry: Arc<HeaderRegistry>,
}

impl Header {
    /// Create an empty `HTTP/1.1` header with the given status line.
    pub fn new(status: impl Into<String>, registry: Arc<HeaderRegistry>) -> Self {
        Self {
            status: status.into(),
            format: HTTP_1_1.to_string(),
            entries: Vec::new(),
            registry,
        }
    }

    /// An empty `200 OK` header.
    pub fn ok(registry: Arc<HeaderRegistry>) -> Self {
        Self::new(STATUS_OK, registry)
    }

    /// Override the protocol version (e.g. `"HTTP/1.0"`).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Status line, e.g. `"404 Not Found"`.
    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Protocol version.
    #[inline]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Registry this header resolves names against.
    #[inline]
    pub fn registry(&self) -> &Arc<HeaderRegistry> {
        &self.registry
    }

    /// Replace the status line and the `Status` header together.
    pub fn set_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.status = status.into();
        let option = self.registry.standard(StandardHeader::Status);
        let value = self.status.clone();
        self.set(&option, value)
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Overwrite: drop every value of `key`, then store `value`.
    pub fn set(&mut self, key: &HeaderOption, value: impl Into<String>) -> &mut Self {
        self.set_with(key, value, false)
    }

    /// Store `value`, appending after existing values when
    /// `allow_duplicates` is set and replacing them otherwise.
    pub fn set_with(
        &mut self,
        key: &HeaderOption,
        value: impl Into<String>,
        allow_duplicates: bool,
    ) -> &mut Self {
        if !allow_duplicates {
            self.remove(key);
        }
        self.entries.push((key.clone(), value.into()));
        self
    }

    /// Append `value` after existing values of `key`.
    pub fn append(&mut self, key: &HeaderOption, value: impl Into<String>) -> &mut Self {
        self.set_with(key, value, true)
    }

    /// Set a header by name, registering the name if unknown.
    pub fn set_named(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let key = self.registry.get_or_create(name);
        self.set(&key, value)
    }

    /// First value stored for `key`.
    pub fn get(&self, key: &HeaderOption) -> Option<&str> {
        self.entries
            .iter()
            .find(|(option, _)| option == key)
            .map(|(_, value)| value.as_str())
    }

    /// Every value stored for `key`, in insertion order.
    pub fn get_multiple(&self, key: &HeaderOption) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(option, _)| option == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Whether any value is stored for `key`.
    pub fn has_header(&self, key: &HeaderOption) -> bool {
        self.entries.iter().any(|(option, _)| option == key)
    }

    /// Drop every value of `key`. Returns how many were removed.
    pub fn remove(&mut self, key: &HeaderOption) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(option, _)| option != key);
        before - self.entries.len()
    }

    /// Drop every value.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderOption, &str)> {
        self.entries
            .iter()
            .map(|(option, value)| (option, value.as_str()))
    }

    /// Pairs whose header may be replayed from a cached response.
    pub fn cache_applicable_entries(&self) -> impl Iterator<Item = (&HeaderOption, &str)> {
        self.iter().filter(|(option, _)| option.is_cache_applicable())
    }

    /// Number of stored values (not distinct names).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no value is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Shortcuts
    // =========================================================================

    /// Point the client at `url`: sets `Location`, `Status` and the status
    /// line in one call.
    pub fn redirect(&mut self, url: impl Into<String>, status: impl Into<String>) -> &mut Self {
        let location = self.registry.standard(StandardHeader::Location);
        self.set(&location, url);
        self.set_status(status)
    }

    /// [`redirect`](Self::redirect) with `307 Temporary Redirect`.
    pub fn redirect_temporary(&mut self, url: impl Into<String>) -> &mut Self {
        self.redirect(url, STATUS_TEMPORARY_REDIRECT)
    }

    /// Add a `Set-Cookie` value.
    ///
    /// An entry with the exact same serialized value is removed first, so
    /// repeating a cookie is idempotent. A cookie with the same name but a
    /// different value or attributes is added as a second entry.
    pub fn set_cookie(&mut self, cookie: &ResponseCookie) -> &mut Self {
        let key = self.registry.standard(StandardHeader::SetCookie);
        let value = cookie.to_string();
        self.entries
            .retain(|(option, existing)| !(option == &key && *existing == value));
        if self.registry.debug() {
            tracing::debug!(cookie = cookie.name(), "setting cookie");
        }
        self.entries.push((key, value));
        self
    }

    /// Instruct the client to drop cookie `name`.
    pub fn remove_cookie(&mut self, name: &str) -> &mut Self {
        self.set_cookie(&ResponseCookie::expired(name))
    }

    /// Set `Date` to the current time.
    pub fn set_date_now(&mut self) -> &mut Self {
        let date = self.registry.standard(StandardHeader::Date);
        self.set(&date, http_date_now())
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("status", &self.status)
            .field("format", &self.format)
            .field("entries", &self.entries)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
