//! Response bodies and their byte streams.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use bytes::Bytes;

use super::header::Header;
use super::option::StandardHeader;
use super::status::{STATUS_NOT_FOUND, content_type_for};
use crate::error::FileResult;
use crate::file::VirtualPath;

// =============================================================================
// Streams
// =============================================================================

/// A readable stream over a buffer whose total length is known up front.
///
/// Each instance has its own read position; the buffer behind it is a
/// cheaply-cloned [`Bytes`] and is never mutated.
#[derive(Clone)]
pub struct KnownLengthStream {
    data: Bytes,
    position: usize,
}

impl KnownLengthStream {
    /// Wrap `data`, positioned at the start.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    /// Total length in bytes, independent of the read position.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// The whole buffer, ignoring the read position.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Release the whole buffer.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl Read for KnownLengthStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = &self.data[self.position..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.position += n;
        Ok(n)
    }
}

impl fmt::Debug for KnownLengthStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnownLengthStream")
            .field("len", &self.data.len())
            .field("position", &self.position)
            .finish()
    }
}

/// The body stream of a response.
pub enum ResponseStream {
    /// Fully buffered; length known before reading.
    Known(KnownLengthStream),
    /// Produced on the fly; length unknown until exhausted.
    Unknown(Box<dyn Read + Send>),
}

impl ResponseStream {
    /// A known-length stream over `data`.
    pub fn known(data: impl Into<Bytes>) -> Self {
        Self::Known(KnownLengthStream::new(data))
    }

    /// A stream of unknown length.
    pub fn unknown(reader: impl Read + Send + 'static) -> Self {
        Self::Unknown(Box::new(reader))
    }

    /// Total length, when known ahead of reading.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Known(stream) => Some(stream.len()),
            Self::Unknown(_) => None,
        }
    }

    /// The known-length stream, if this is one.
    pub fn into_known(self) -> Option<KnownLengthStream> {
        match self {
            Self::Known(stream) => Some(stream),
            Self::Unknown(_) => None,
        }
    }
}

impl Read for ResponseStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Known(stream) => stream.read(buf),
            Self::Unknown(reader) => reader.read(buf),
        }
    }
}

impl fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(stream) => f.debug_tuple("Known").field(stream).finish(),
            Self::Unknown(_) => f.write_str("Unknown"),
        }
    }
}

// =============================================================================
// ResponseBody
// =============================================================================

/// Anything that can be delivered as a response: metadata plus a body.
pub trait ResponseBody {
    /// Response metadata.
    fn header(&self) -> &Header;

    /// Whether the body is textual.
    fn is_text(&self) -> bool;

    /// Consume the body, yielding header, stream and text flag.
    fn into_parts(self) -> (Header, ResponseStream, bool)
    where
        Self: Sized;
}

/// A freshly generated response.
#[derive(Debug)]
pub struct Response {
    header: Header,
    stream: ResponseStream,
    is_text: bool,
}

impl Response {
    /// A text response.
    pub fn text(header: Header, content: impl Into<String>) -> Self {
        Self {
            header,
            stream: ResponseStream::known(content.into()),
            is_text: true,
        }
    }

    /// A binary response with a known length.
    pub fn bytes(header: Header, content: impl Into<Bytes>) -> Self {
        Self {
            header,
            stream: ResponseStream::known(content),
            is_text: false,
        }
    }

    /// A response streamed from `reader`; its length is unknown and it
    /// cannot be snapshotted.
    pub fn streaming(header: Header, reader: impl Read + Send + 'static, is_text: bool) -> Self {
        Self {
            header,
            stream: ResponseStream::unknown(reader),
            is_text,
        }
    }

    /// Serve the content of `path`.
    ///
    /// Sets `Content-Type` from the extension and `Content-Length` from the
    /// body. Text bodies go through [`VirtualPath::read_text`], so they are
    /// served from the content cache when present; binary bodies are read
    /// from disk. A path that does not exist yields an empty body and a
    /// `404 Not Found` status.
    pub fn from_path(path: &VirtualPath, mut header: Header) -> FileResult<Self> {
        if !path.exists() || path.is_folder() {
            header.set_status(STATUS_NOT_FOUND);
            return Ok(Self::bytes(header, Bytes::new()));
        }

        let (content_type, is_text) = content_type_for(path.extension());
        let body = if is_text {
            let text = path.read_text()?;
            Bytes::copy_from_slice(text.as_bytes())
        } else {
            Bytes::from(path.read_bytes()?)
        };

        let registry = Arc::clone(header.registry());
        header
            .set(&registry.standard(StandardHeader::ContentType), content_type)
            .set(
                &registry.standard(StandardHeader::ContentLength),
                body.len().to_string(),
            );

        Ok(Self {
            header,
            stream: ResponseStream::Known(KnownLengthStream::new(body)),
            is_text,
        })
    }

    /// Mutable access to the metadata until the response is consumed.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// The body stream.
    pub fn stream(&self) -> &ResponseStream {
        &self.stream
    }
}

impl ResponseBody for Response {
    fn header(&self) -> &Header {
        &self.header
    }

    fn is_text(&self) -> bool {
        self.is_text
    }

    fn into_parts(self) -> (Header, ResponseStream, bool) {
        (self.header, self.stream, self.is_text)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ContentCache, MemoryContentCache};
    use crate::file::{LINE_SEPARATOR, VirtualFileSystem};
    use crate::response::{HeaderRegistry, STATUS_OK};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_known_stream_reads_all() {
        let mut stream = KnownLengthStream::new("hello");
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();

        assert_eq!(out, "hello");
        assert_eq!(stream.remaining(), 0);
        assert_eq!(stream.len(), 5);
    }

    #[test]
    fn test_known_stream_small_buffer() {
        let mut stream = KnownLengthStream::new(&b"abcdef"[..]);
        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(stream.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_stream_len() {
        assert_eq!(ResponseStream::known("abc").len(), Some(3));
        assert_eq!(ResponseStream::unknown(io::empty()).len(), None);
    }

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();

        let vfs = VirtualFileSystem::new(dir.path());
        let registry = HeaderRegistry::shared();
        let response =
            Response::from_path(&vfs.get("index.html"), Header::ok(registry.clone())).unwrap();

        let length = 9 + LINE_SEPARATOR.len();
        assert!(response.is_text());
        assert_eq!(response.header().status(), STATUS_OK);
        assert_eq!(
            response
                .header()
                .get(&registry.standard(StandardHeader::ContentLength)),
            Some(length.to_string().as_str())
        );
        assert_eq!(
            response
                .header()
                .get(&registry.standard(StandardHeader::ContentType)),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(response.stream().len(), Some(length));
    }

    #[test]
    fn test_from_path_text_served_from_content_cache() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

        let cache = Arc::new(MemoryContentCache::new());
        let vfs = VirtualFileSystem::builder(dir.path())
            .content_cache(cache.clone())
            .build();
        let registry = HeaderRegistry::shared();
        let script = vfs.get("app.js");

        Response::from_path(&script, Header::ok(registry.clone())).unwrap();
        assert!(cache.read_if_present("app.js").is_some());

        // Only the cache can answer once the file is gone.
        fs::remove_file(dir.path().join("app.js")).unwrap();
        let (_, stream, is_text) = Response::from_path(&script, Header::ok(registry))
            .unwrap()
            .into_parts();
        let mut body = String::new();
        match stream {
            ResponseStream::Known(mut known) => known.read_to_string(&mut body).unwrap(),
            ResponseStream::Unknown(_) => panic!("expected a known-length body"),
        };
        assert!(is_text);
        assert_eq!(body, format!("console.log(1){LINE_SEPARATOR}"));
    }

    #[test]
    fn test_from_path_binary_bypasses_content_cache() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0xff]).unwrap();

        let cache = Arc::new(MemoryContentCache::new());
        let vfs = VirtualFileSystem::builder(dir.path())
            .content_cache(cache.clone())
            .build();
        let response =
            Response::from_path(&vfs.get("logo.png"), Header::ok(HeaderRegistry::shared()))
                .unwrap();

        assert!(!response.is_text());
        assert_eq!(response.stream().len(), Some(5));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_from_missing_path() {
        let dir = TempDir::new().unwrap();
        let vfs = VirtualFileSystem::new(dir.path());

        let response =
            Response::from_path(&vfs.get("nope.html"), Header::ok(HeaderRegistry::shared()))
                .unwrap();
        assert_eq!(response.header().status(), STATUS_NOT_FOUND);
        assert_eq!(response.stream().len(), Some(0));
    }
}
