//! The path registry and factory.
//!
//! # Resolution
//!
//! ```text
//! resolve(parent, "assets/app.js")
//! ├── normalize ──► "assets/app.js"
//! ├── registry hit ──► same VirtualPath instance
//! └── miss ──► stat once ──► register ──► new instance
//! ```
//!
//! The registry is shared by all worker threads. Lookups take a read lock;
//! construction happens under the write lock so two workers racing on the
//! same new path observe a single instance.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::extension::Extension;
use super::normalize::{self, absolute_root};
use super::path::VirtualPath;
use crate::cache::{ContentCache, MemoryContentCache, NoContentCache};
use crate::config::Config;

// =============================================================================
// Shared State
// =============================================================================

/// State shared by the file system and every path it created.
pub(crate) struct Shared {
    root_dir: PathBuf,
    cache: Arc<dyn ContentCache>,
    config: Config,
    registry: RwLock<FxHashMap<String, VirtualPath>>,
}

impl Shared {
    pub(crate) fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub(crate) fn cache(&self) -> &Arc<dyn ContentCache> {
        &self.cache
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    fn lookup(&self, key: &str) -> Option<VirtualPath> {
        self.registry.read().get(key).cloned()
    }

    /// Return the registered instance for a normalized key, creating it once.
    pub(crate) fn intern(self: &Arc<Self>, key: String, is_folder: bool) -> VirtualPath {
        if let Some(path) = self.lookup(&key) {
            return path;
        }

        let mut registry = self.registry.write();
        registry
            .entry(key)
            .or_insert_with_key(|key| {
                let path = VirtualPath::new(self, key.clone(), is_folder);
                tracing::debug!(path = %key, is_folder, exists = path.exists(), "registered path");
                path
            })
            .clone()
    }
}

// =============================================================================
// VirtualFileSystem
// =============================================================================

/// Owns a root directory and every [`VirtualPath`] resolved against it.
///
/// # Example
///
/// ```no_run
/// use virtual_serve::file::{Extension, VirtualFileSystem};
///
/// let vfs = VirtualFileSystem::new("public");
/// let assets = vfs.get("assets/");
/// let page = vfs.resolve_with(&vfs.root(), "index", &Extension::HTML);
/// let html = page.read_text()?;
/// # Ok::<(), virtual_serve::error::FileError>(())
/// ```
#[derive(Clone)]
pub struct VirtualFileSystem {
    shared: Arc<Shared>,
}

impl VirtualFileSystem {
    /// Create a file system over `root` with an in-memory content cache and
    /// default configuration.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::builder(root).build()
    }

    /// Start configuring a file system over `root`.
    pub fn builder(root: impl AsRef<Path>) -> VirtualFileSystemBuilder {
        VirtualFileSystemBuilder::new(root.as_ref())
    }

    /// The absolute root directory.
    pub fn root_dir(&self) -> &Path {
        self.shared.root_dir()
    }

    /// The active content cache backend.
    pub fn content_cache(&self) -> &Arc<dyn ContentCache> {
        self.shared.cache()
    }

    /// The configuration this file system was built with.
    pub fn config(&self) -> &Config {
        self.shared.config()
    }

    /// The root folder (normalized path `""`).
    pub fn root(&self) -> VirtualPath {
        self.shared.intern(String::new(), true)
    }

    /// Resolve `raw` relative to the root.
    pub fn get(&self, raw: &str) -> VirtualPath {
        self.resolve(&self.root(), raw)
    }

    /// Resolve `raw` relative to `parent`.
    ///
    /// Never fails: a path that does not exist is returned with
    /// [`VirtualPath::exists`] reporting `false`.
    ///
    /// A trailing separator makes the result a folder. Otherwise an existing
    /// directory is a folder, an existing file is a file, and a missing path
    /// is a folder only when its last segment has no `.`.
    pub fn resolve(&self, parent: &VirtualPath, raw: &str) -> VirtualPath {
        let joined = normalize::join(&folder_prefix(parent), raw);

        if normalize::has_trailing_separator(raw) || (raw.is_empty() && parent.is_folder()) {
            return self.shared.intern(normalize::normalize(&joined, true), true);
        }

        let as_file = normalize::normalize(&joined, false);
        if as_file.is_empty() {
            return self.root();
        }
        if let Some(path) = self.shared.lookup(&as_file) {
            return path;
        }
        let as_folder = normalize::normalize(&joined, true);
        if let Some(path) = self.shared.lookup(&as_folder) {
            return path;
        }

        let disk = self.root_dir().join(&as_file);
        let is_folder = match disk.metadata() {
            Ok(meta) => meta.is_dir(),
            Err(_) => !normalize::looks_like_file(&as_file),
        };
        if is_folder {
            self.shared.intern(as_folder, true)
        } else {
            self.shared.intern(as_file, false)
        }
    }

    /// Resolve `name` under `parent` without knowing its extension.
    ///
    /// Extensions are tried in order; for each one, the children of `parent`
    /// are searched for an entity name equal to `name` (case-insensitive).
    /// When nothing matches, `name.<first extension>` is resolved instead.
    pub fn resolve_with(
        &self,
        parent: &VirtualPath,
        name: &str,
        extensions: &Extension,
    ) -> VirtualPath {
        let children = parent.children(true);
        for ext in extensions.extensions() {
            let found = children.iter().find(|child| {
                child.entity_name().eq_ignore_ascii_case(name)
                    && child.extension().eq_ignore_ascii_case(ext)
            });
            if let Some(child) = found {
                return child.clone();
            }
        }

        match extensions.primary() {
            Some(ext) => self.resolve(parent, &format!("{name}.{ext}")),
            None => self.resolve(parent, name),
        }
    }

    /// Drop `path` from the registry.
    ///
    /// The next resolution of the same string re-queries the filesystem and
    /// lists the folder afresh. Existing handles keep their old state.
    /// Returns whether the path was registered.
    pub fn invalidate(&self, path: &VirtualPath) -> bool {
        let mut registry = self.shared.registry.write();
        let registered = registry
            .get(path.as_str())
            .is_some_and(|registered| registered.same_instance(path));
        if registered {
            registry.remove(path.as_str());
        }
        registered
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.shared.registry.read().len()
    }

    /// Whether no path has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.shared.registry.read().is_empty()
    }
}

/// The parent's key as a folder prefix.
fn folder_prefix(parent: &VirtualPath) -> std::borrow::Cow<'_, str> {
    let key = parent.as_str();
    if key.is_empty() || key.ends_with('/') {
        key.into()
    } else {
        format!("{key}/").into()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`VirtualFileSystem`].
pub struct VirtualFileSystemBuilder {
    root: PathBuf,
    cache: Option<Arc<dyn ContentCache>>,
    config: Config,
}

impl VirtualFileSystemBuilder {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            cache: None,
            config: Config::default(),
        }
    }

    /// Use a specific content cache backend.
    ///
    /// Default: [`MemoryContentCache`]
    pub fn content_cache<C: ContentCache + 'static>(mut self, cache: C) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Use an already shared content cache backend.
    pub fn shared_content_cache(mut self, cache: Arc<dyn ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Apply a configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the file system.
    ///
    /// With caching disabled, the backend is replaced by [`NoContentCache`].
    pub fn build(self) -> VirtualFileSystem {
        let cache: Arc<dyn ContentCache> = if self.config.cache_enabled {
            self.cache
                .unwrap_or_else(|| Arc::new(MemoryContentCache::new()))
        } else {
            Arc::new(NoContentCache)
        };

        VirtualFileSystem {
            shared: Arc::new(Shared {
                root_dir: absolute_root(&self.root),
                cache,
                config: self.config,
                registry: RwLock::new(FxHashMap::default()),
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
