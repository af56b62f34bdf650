//! Virtual file resolution over a root directory.
//!
//! # Structure
//!
//! ```text
//! VirtualFileSystem
//! ├── root directory (absolute)
//! ├── ContentCache backend (shared)
//! └── registry: FxHashMap<String, VirtualPath>
//!     └── VirtualPath ("assets/")
//!         └── children (listed once)
//!             ├── VirtualPath ("assets/app.js")
//!             └── VirtualPath ("assets/app.css")
//! ```

mod extension;
mod normalize;
mod path;
mod policy;
mod system;
#[cfg(feature = "batch")]
mod warm;

pub use extension::Extension;
pub use normalize::{absolute_root, normalize};
pub use path::{LINE_SEPARATOR, VirtualPath};
pub use policy::IoPolicy;
pub use system::{VirtualFileSystem, VirtualFileSystemBuilder};
