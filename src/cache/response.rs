//! Immutable response snapshots.
//!
//! ```text
//! Response ──► CachedResponse::new ──► Arc<CachedResponse>
//!  (header,                              ├── response_stream() ──► KnownLengthStream #1
//!   known-length body)                   ├── response_stream() ──► KnownLengthStream #2
//!                                        └── ...
//! ```
//!
//! The body buffer is captured once and never written again; every reader
//! gets its own stream with its own position.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use crate::error::SnapshotError;
use crate::response::{Header, HeaderOption, KnownLengthStream, ResponseBody, ResponseStream};

/// Frozen copy of a generated response.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use virtual_serve::cache::CachedResponse;
/// use virtual_serve::response::{Header, HeaderRegistry, Response};
///
/// let response = Response::text(Header::ok(HeaderRegistry::shared()), "hello");
/// let cached = CachedResponse::new(response).unwrap();
///
/// let mut body = String::new();
/// cached.response_stream().read_to_string(&mut body).unwrap();
/// assert_eq!(body, "hello");
/// ```
pub struct CachedResponse {
    id: Uuid,
    header: Header,
    is_text: bool,
    body: Bytes,
}

impl CachedResponse {
    /// Freeze `source`, consuming it.
    ///
    /// Fails with [`SnapshotError::UnknownLength`] when the body is not a
    /// known-length stream.
    pub fn new<B: ResponseBody>(source: B) -> Result<Self, SnapshotError> {
        let id = Uuid::new_v4();
        let (header, stream, is_text) = source.into_parts();
        let Some(known) = stream.into_known() else {
            return Err(SnapshotError::UnknownLength { id });
        };

        let body = Bytes::copy_from_slice(known.as_bytes());
        tracing::debug!(%id, len = body.len(), status = header.status(), "response snapshot created");

        Ok(Self {
            id,
            header,
            is_text,
            body,
        })
    }

    /// Unique identifier assigned at construction.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Header as captured.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Whether the body is textual.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.is_text
    }

    /// Body length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// A new stream positioned at the start of the body.
    pub fn response_stream(&self) -> KnownLengthStream {
        tracing::trace!(id = %self.id, "fresh snapshot stream");
        KnownLengthStream::new(self.body.clone())
    }

    /// A copy of the header without entries that must not be replayed
    /// (cookies, dates).
    pub fn reusable_headers(&self) -> Header {
        let mut header = Header::new(self.header.status(), Arc::clone(self.header.registry()))
            .with_format(self.header.format());
        for (option, value) in self.header.cache_applicable_entries() {
            header.append(option, value);
        }
        header
    }

    /// Headers that were dropped by [`reusable_headers`](Self::reusable_headers).
    pub fn volatile_headers(&self) -> impl Iterator<Item = (&HeaderOption, &str)> {
        self.header
            .iter()
            .filter(|(option, _)| !option.is_cache_applicable())
    }
}

impl ResponseBody for Arc<CachedResponse> {
    fn header(&self) -> &Header {
        &self.header
    }

    fn is_text(&self) -> bool {
        self.is_text
    }

    fn into_parts(self) -> (Header, ResponseStream, bool) {
        (
            self.header.clone(),
            ResponseStream::Known(self.response_stream()),
            self.is_text,
        )
    }
}

impl fmt::Debug for CachedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedResponse")
            .field("id", &self.id)
            .field("status", &self.header.status())
            .field("is_text", &self.is_text)
            .field("len", &self.body.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
