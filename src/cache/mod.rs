//! Content and response caches.
//!
//! - [`ContentCache`]: decoded file text, consulted by
//!   [`VirtualPath::read_text`](crate::file::VirtualPath::read_text).
//! - [`CachedResponse`]: an immutable snapshot of one generated response.
//! - [`ResponseCache`]: snapshots keyed by request target.

mod content;
mod response;
mod store;

pub use content::{ContentCache, MemoryContentCache, NoContentCache};
pub use response::CachedResponse;
pub use store::ResponseCache;
