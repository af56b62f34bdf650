//! # virtual-serve
//!
//! Virtual file resolution and response caching for a request-serving
//! server.
//!
//! A server instance owns one [`VirtualFileSystem`] rooted at its content
//! directory. Requests resolve to [`VirtualPath`]s, whose text is served
//! through a pluggable [`ContentCache`] so repeated reads skip the disk.
//! Generated responses carry a [`Header`] and may be frozen into a
//! [`CachedResponse`] that hands every later reader its own stream.
//!
//! ```text
//! request target
//!   └─► VirtualFileSystem::get / resolve_with
//!         └─► VirtualPath::read_text ──► ContentCache (hit?) ──► disk
//!               └─► Response { Header, body }
//!                     └─► ResponseCache ──► Arc<CachedResponse>
//!                           └─► response_stream() per delivery
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use virtual_serve::prelude::*;
//!
//! let vfs = VirtualFileSystem::builder("public")
//!     .config(Config::builder().io_policy(IoPolicy::Degrade).build())
//!     .build();
//! let registry = HeaderRegistry::shared();
//! let responses = ResponseCache::new();
//!
//! let path = vfs.get("assets/app.js");
//! let cached = responses.get_or_try_insert_with(path.as_str(), || {
//!     Response::from_path(&path, Header::ok(registry.clone())).map_err(ServeError::from)
//! })?;
//! # Ok::<(), ServeError>(())
//! ```
//!
//! ## Modules
//!
//! - [`mod@file`]: paths, the file system registry and read policies
//! - [`cache`]: content cache backends and response snapshots
//! - [`response`]: headers, cookies, status lines and bodies
//! - [`config`]: per-instance configuration
//! - [`error`]: error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod file;
pub mod prelude;
pub mod response;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::{CachedResponse, ContentCache, MemoryContentCache, NoContentCache, ResponseCache};
pub use config::{Config, ConfigBuilder};
pub use error::{FileError, FileResult, ServeError, SnapshotError};
pub use file::{Extension, IoPolicy, VirtualFileSystem, VirtualFileSystemBuilder, VirtualPath};
pub use response::{
    Header, HeaderOption, HeaderRegistry, Response, ResponseBody, ResponseCookie, StandardHeader,
};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_serve_resolved_asset_from_snapshot() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        fs::write(dir.path().join("assets/app.css"), "body{}").unwrap();

        let vfs = VirtualFileSystem::new(dir.path());
        let registry = HeaderRegistry::shared();
        let responses = ResponseCache::new();

        let assets = vfs.get("/assets/");
        let script = vfs.resolve_with(&assets, "app", &Extension::new(["js", "css"]));
        assert_eq!(script.as_str(), "assets/app.js");

        let build = || {
            Response::from_path(&script, Header::ok(Arc::clone(&registry))).map_err(ServeError::from)
        };
        let first = responses.get_or_try_insert_with(script.as_str(), build).unwrap();

        fs::remove_file(dir.path().join("assets/app.js")).unwrap();
        let second = responses.get_or_try_insert_with(script.as_str(), build).unwrap();
        assert_eq!(first.id(), second.id());

        let mut body = String::new();
        second.response_stream().read_to_string(&mut body).unwrap();
        assert_eq!(body, format!("console.log(1){}", file::LINE_SEPARATOR));
        assert!(second.is_text());
    }
}
