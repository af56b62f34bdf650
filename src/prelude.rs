//! Prelude module for convenient imports.
//!
//! ```
//! use virtual_serve::prelude::*;
//! ```

// Files
pub use crate::file::{Extension, IoPolicy, VirtualFileSystem, VirtualPath};

// Caches
pub use crate::cache::{CachedResponse, ContentCache, MemoryContentCache, ResponseCache};

// Responses
pub use crate::response::{
    Header, HeaderOption, HeaderRegistry, Response, ResponseBody, ResponseCookie, StandardHeader,
};

// Configuration & errors
pub use crate::config::Config;
pub use crate::error::{FileError, FileResult, ServeError, SnapshotError};
