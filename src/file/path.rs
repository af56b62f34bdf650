//! A node in the virtual file tree.
//!
//! # Layout
//!
//! ```text
//! VirtualPath (cheap handle, Arc)
//! └── PathNode
//!     ├── path: "assets/app.js"       ── identity, cache key
//!     ├── is_folder / exists          ── fixed at construction
//!     ├── disk_path: <root>/assets/app.js
//!     └── children: OnceLock<listing> ── populated once, read lock-free
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use crate::cache::ContentCache;
use crate::error::{FileError, FileResult};

use super::normalize::{self, file_name};
use super::policy::IoPolicy;
use super::system::Shared;

/// Separator appended after every line by [`VirtualPath::read_text`].
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Separator appended after every line by [`VirtualPath::read_text`].
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

type Listing = BTreeMap<String, VirtualPath>;

/// A file or folder relative to the root of a
/// [`VirtualFileSystem`](super::VirtualFileSystem).
///
/// Instances are only created by the file system, which hands out the same
/// instance for the same normalized path. Cloning is cheap and yields another
/// handle to that instance.
///
/// Equality and hashing use the normalized path string only; `is_folder` and
/// `exists` do not take part.
#[derive(Clone)]
pub struct VirtualPath {
    node: Arc<PathNode>,
}

struct PathNode {
    path: String,
    is_folder: bool,
    exists: AtomicBool,
    disk_path: PathBuf,
    children: OnceLock<Listing>,
    cache: Arc<dyn ContentCache>,
    policy: IoPolicy,
    shared: Weak<Shared>,
}

impl VirtualPath {
    /// Construct a path node, querying the filesystem once for existence.
    ///
    /// `path` must already be normalized.
    pub(crate) fn new(shared: &Arc<Shared>, path: String, is_folder: bool) -> Self {
        let disk_path = shared.root_dir().join(&path);
        let exists = disk_path.exists();
        Self {
            node: Arc::new(PathNode {
                path,
                is_folder,
                exists: AtomicBool::new(exists),
                disk_path,
                children: OnceLock::new(),
                cache: shared.cache().clone(),
                policy: shared.config().io_policy,
                shared: Arc::downgrade(shared),
            }),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The normalized path string.
    ///
    /// No leading separator; folders end with `/`. This is also the
    /// content-cache key.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.node.path
    }

    /// Whether this path denotes a folder.
    #[inline]
    pub fn is_folder(&self) -> bool {
        self.node.is_folder
    }

    /// Whether the backing file existed when this path was resolved.
    ///
    /// Not re-checked automatically; see
    /// [`VirtualFileSystem::invalidate`](super::VirtualFileSystem::invalidate).
    #[inline]
    pub fn exists(&self) -> bool {
        self.node.exists.load(Ordering::Acquire)
    }

    /// The backing location on disk.
    #[inline]
    pub fn disk_path(&self) -> &Path {
        &self.node.disk_path
    }

    /// Last segment up to its first `.` (`"app"` for `assets/app.min.js`).
    pub fn entity_name(&self) -> &str {
        let name = file_name(&self.node.path);
        name.split('.').next().unwrap_or(name)
    }

    /// Text after the last `.` of a file name; empty for folders and
    /// files without one.
    pub fn extension(&self) -> &str {
        if self.node.is_folder {
            return "";
        }
        file_name(&self.node.path)
            .rsplit_once('.')
            .map_or("", |(_, ext)| ext)
    }

    /// Whether both handles point at the same registered instance.
    #[inline]
    pub fn same_instance(&self, other: &VirtualPath) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Size of the file in bytes.
    ///
    /// A missing path has no size and is never an error. `None` under
    /// [`IoPolicy::Degrade`] when the size of an existing file cannot be read.
    pub fn len(&self) -> FileResult<Option<u64>> {
        if !self.exists() {
            return Ok(None);
        }
        let path = self.disk_path();
        self.node
            .policy
            .apply(path, fs::metadata(path).map(|m| Some(m.len())), || None)
    }

    /// Read the raw file bytes.
    ///
    /// A path that does not exist reads as empty. I/O failures follow the
    /// configured [`IoPolicy`].
    pub fn read_bytes(&self) -> FileResult<Vec<u8>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        if self.node.is_folder {
            return self
                .node
                .policy
                .recover(FileError::IsDirectory(self.node.disk_path.clone()), Vec::new);
        }
        let path = self.disk_path();
        self.node.policy.apply(path, fs::read(path), Vec::new)
    }

    /// Read the file as text, consulting the content cache first.
    ///
    /// On a miss the file is read line by line, each line followed by
    /// [`LINE_SEPARATOR`], and the result is written back to the cache.
    /// Missing paths and failed reads are never cached.
    pub fn read_text(&self) -> FileResult<Arc<str>> {
        let node = &self.node;
        if let Some(cached) = node.cache.read_if_present(&node.path) {
            tracing::trace!(path = %node.path, "content cache hit");
            return Ok(cached);
        }
        tracing::trace!(path = %node.path, "content cache miss");

        if !self.exists() {
            return Ok(Arc::from(""));
        }
        if node.is_folder {
            return node
                .policy
                .recover(FileError::IsDirectory(node.disk_path.clone()), || Arc::from(""));
        }

        match read_lines(&node.disk_path) {
            Ok(text) => {
                let text: Arc<str> = Arc::from(text);
                node.cache.write(&node.path, text.clone());
                Ok(text)
            }
            Err(error) => node
                .policy
                .apply(&node.disk_path, Err(error), || Arc::from("")),
        }
    }

    /// Whether the content cache currently holds this path.
    pub fn is_cached(&self) -> bool {
        self.node.cache.read_if_present(&self.node.path).is_some()
    }

    /// Create the file, or the folder and its parents, if it does not exist.
    ///
    /// Returns whether this call created it.
    pub fn create(&self) -> FileResult<bool> {
        if self.exists() {
            return Ok(false);
        }
        let path = self.disk_path();
        let result = if self.node.is_folder {
            fs::create_dir_all(path)
        } else {
            create_file(path)
        };
        let created = self.node.policy.apply(path, result.map(|()| true), || false)?;
        if created {
            self.node.exists.store(true, Ordering::Release);
        }
        Ok(created)
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Child paths of this folder.
    ///
    /// The folder is listed on first access and never rescanned for this
    /// instance. Files, missing folders and failed listings have no children.
    pub fn children(&self, include_folders: bool) -> Vec<VirtualPath> {
        self.listing()
            .values()
            .filter(|child| include_folders || !child.is_folder())
            .cloned()
            .collect()
    }

    /// Child paths (folders included) matching every predicate.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let css = assets.children_matching(&[
    ///     &|p: &VirtualPath| !p.is_folder(),
    ///     &|p: &VirtualPath| p.extension() == "css",
    /// ]);
    /// ```
    pub fn children_matching(&self, predicates: &[&dyn Fn(&VirtualPath) -> bool]) -> Vec<VirtualPath> {
        self.listing()
            .values()
            .filter(|child| predicates.iter().all(|predicate| predicate(child)))
            .cloned()
            .collect()
    }

    fn listing(&self) -> &Listing {
        self.node.children.get_or_init(|| self.load_children())
    }

    fn load_children(&self) -> Listing {
        let mut listing = Listing::new();
        if !self.node.is_folder || !self.exists() {
            return listing;
        }
        let Some(shared) = self.node.shared.upgrade() else {
            return listing;
        };

        let entries = match fs::read_dir(&self.node.disk_path) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(path = %self.node.path, %error, "failed to list folder");
                return listing;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            // Follows symlinks, matching `resolve`.
            let is_folder = fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir());
            let raw = normalize::join(&self.node.path, &name.to_string_lossy());
            let child = shared.intern(normalize::normalize(&raw, is_folder), is_folder);
            listing.insert(child.as_str().to_owned(), child);
        }

        tracing::debug!(path = %self.node.path, children = listing.len(), "listed folder");
        listing
    }
}

/// Read a file line by line, stripping a UTF-8 BOM.
fn read_lines(path: &Path) -> io::Result<String> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut document = String::new();
    for line in reader.lines() {
        let line = line?;
        let line = if document.is_empty() {
            line.strip_prefix('\u{feff}').unwrap_or(line.as_str())
        } else {
            line.as_str()
        };
        document.push_str(line);
        document.push_str(LINE_SEPARATOR);
    }
    Ok(document)
}

fn create_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(drop)
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl PartialEq for VirtualPath {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other) || self.node.path == other.node.path
    }
}

impl Eq for VirtualPath {}

impl Hash for VirtualPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.path.hash(state);
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node.path)
    }
}

impl fmt::Debug for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualPath")
            .field("path", &self.node.path)
            .field("is_folder", &self.node.is_folder)
            .field("exists", &self.exists())
            .finish()
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryContentCache;
    use crate::config::ConfigBuilder;
    use crate::file::VirtualFileSystem;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// Records every cache call.
    #[derive(Default)]
    struct SpyCache {
        inner: MemoryContentCache,
        reads: AtomicUsize,
        hits: AtomicUsize,
        writes: AtomicUsize,
    }

    impl ContentCache for SpyCache {
        fn read_if_present(&self, key: &str) -> Option<Arc<str>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let found = self.inner.read_if_present(key);
            if found.is_some() {
                self.hits.fetch_add(1, Ordering::SeqCst);
            }
            found
        }

        fn write(&self, key: &str, content: Arc<str>) {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.write(key, content);
        }
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets/img")).unwrap();
        fs::write(dir.path().join("index.html"), "<h1>\nhello\n</h1>").unwrap();
        fs::write(dir.path().join("assets/app.js"), "let a = 1;").unwrap();
        fs::write(dir.path().join("assets/app.css"), "body {}").unwrap();
        dir
    }

    fn spy_fs(dir: &TempDir) -> (VirtualFileSystem, Arc<SpyCache>) {
        let spy = Arc::new(SpyCache::default());
        let vfs = VirtualFileSystem::builder(dir.path())
            .content_cache(spy.clone())
            .build();
        (vfs, spy)
    }

    #[test]
    fn test_read_text_appends_separator_per_line() {
        let dir = fixture();
        let (vfs, _) = spy_fs(&dir);
        let index = vfs.get("index.html");
        let expected = format!("<h1>{LINE_SEPARATOR}hello{LINE_SEPARATOR}</h1>{LINE_SEPARATOR}");
        assert_eq!(&*index.read_text().unwrap(), expected);
    }

    #[test]
    fn test_read_text_second_call_served_from_cache() {
        let dir = fixture();
        let (vfs, spy) = spy_fs(&dir);
        let index = vfs.get("index.html");

        let first = index.read_text().unwrap();
        assert_eq!(spy.writes.load(Ordering::SeqCst), 1);

        // The file is gone; only the cache can answer now.
        fs::remove_file(dir.path().join("index.html")).unwrap();
        let second = index.read_text().unwrap();

        assert_eq!(first, second);
        assert_eq!(spy.hits.load(Ordering::SeqCst), 1);
        assert_eq!(spy.writes.load(Ordering::SeqCst), 1);
        assert!(index.is_cached());
    }

    #[test]
    fn test_missing_path_reads_empty_and_is_not_cached() {
        let dir = fixture();
        let (vfs, spy) = spy_fs(&dir);
        let missing = vfs.get("nope.html");

        assert!(!missing.exists());
        assert_eq!(&*missing.read_text().unwrap(), "");
        assert!(missing.read_bytes().unwrap().is_empty());
        assert_eq!(spy.writes.load(Ordering::SeqCst), 0);
        assert!(spy.inner.read_if_present("nope.html").is_none());
    }

    #[test]
    fn test_read_text_strips_bom() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bom.txt"), b"\xef\xbb\xbfHello").unwrap();
        let vfs = VirtualFileSystem::new(dir.path());
        assert_eq!(&*vfs.get("bom.txt").read_text().unwrap(), format!("Hello{LINE_SEPARATOR}"));
    }

    #[test]
    fn test_read_bytes() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        assert_eq!(vfs.get("assets/app.js").read_bytes().unwrap(), b"let a = 1;");
    }

    #[test]
    fn test_vanished_file_degrades_by_default() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        let app = vfs.get("assets/app.js");
        fs::remove_file(dir.path().join("assets/app.js")).unwrap();

        assert!(app.exists());
        assert!(app.read_bytes().unwrap().is_empty());
        assert_eq!(app.len().unwrap(), None);
        assert_eq!(&*app.read_text().unwrap(), "");
        assert!(!app.is_cached());
    }

    #[test]
    fn test_vanished_file_strict_propagates() {
        let dir = fixture();
        let config = ConfigBuilder::new().io_policy(IoPolicy::Strict).build();
        let vfs = VirtualFileSystem::builder(dir.path()).config(config).build();
        let app = vfs.get("assets/app.js");
        fs::remove_file(dir.path().join("assets/app.js")).unwrap();

        assert!(matches!(app.read_bytes(), Err(FileError::NotFound(_))));
        assert!(matches!(app.read_text(), Err(FileError::NotFound(_))));
        assert!(app.len().is_err());
    }

    #[test]
    fn test_invalid_utf8_strict() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bin.txt"), [0xff, 0xfe, 0x00]).unwrap();
        let config = ConfigBuilder::new().io_policy(IoPolicy::Strict).build();
        let vfs = VirtualFileSystem::builder(dir.path()).config(config).build();
        assert!(matches!(
            vfs.get("bin.txt").read_text(),
            Err(FileError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_len() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        assert_eq!(vfs.get("assets/app.css").len().unwrap(), Some(7));
    }

    #[test]
    fn test_len_of_missing_path_strict() {
        let dir = fixture();
        let config = ConfigBuilder::new().io_policy(IoPolicy::Strict).build();
        let vfs = VirtualFileSystem::builder(dir.path()).config(config).build();
        assert_eq!(vfs.get("nope.txt").len().unwrap(), None);
    }

    #[test]
    fn test_names() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        let app = vfs.get("assets/app.min.js");
        assert_eq!(app.entity_name(), "app");
        assert_eq!(app.extension(), "js");

        let assets = vfs.get("assets/");
        assert!(assets.is_folder());
        assert_eq!(assets.entity_name(), "assets");
        assert_eq!(assets.extension(), "");
    }

    #[test]
    fn test_children() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        let assets = vfs.get("assets/");

        let all: Vec<String> = assets.children(true).iter().map(ToString::to_string).collect();
        assert_eq!(all, ["assets/app.css", "assets/app.js", "assets/img/"]);

        let files = assets.children(false);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| !p.is_folder()));

        // Children are registry instances.
        assert!(files[1].same_instance(&vfs.get("assets/app.js")));
    }

    #[cfg(unix)]
    #[test]
    fn test_children_symlinked_folder() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("assets"), dir.path().join("link")).unwrap();
        let vfs = VirtualFileSystem::new(dir.path());

        let names: Vec<String> = vfs.root().children(true).iter().map(ToString::to_string).collect();
        assert!(names.contains(&"link/".to_string()));

        let link = vfs.get("link");
        assert!(link.is_folder());
        assert_eq!(link.as_str(), "link/");
        assert_eq!(link.children(true).len(), 3);
    }

    #[test]
    fn test_children_listing_is_not_rescanned() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        let assets = vfs.get("assets/");
        assert_eq!(assets.children(true).len(), 3);

        fs::write(dir.path().join("assets/late.txt"), "late").unwrap();
        assert_eq!(assets.children(true).len(), 3);
    }

    #[test]
    fn test_children_of_file_and_missing_folder() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        assert!(vfs.get("index.html").children(true).is_empty());
        assert!(vfs.get("missing/").children(true).is_empty());
    }

    #[test]
    fn test_children_matching_is_conjunctive() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        let assets = vfs.get("assets/");

        let css = assets.children_matching(&[
            &|p: &VirtualPath| !p.is_folder(),
            &|p: &VirtualPath| p.extension() == "css",
        ]);
        assert_eq!(css.len(), 1);
        assert_eq!(css[0].as_str(), "assets/app.css");

        assert_eq!(assets.children_matching(&[]).len(), 3);
    }

    #[test]
    fn test_concurrent_first_listing() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        let assets = vfs.get("assets/");

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(assets.children(true).len(), 3));
            }
        });
    }

    #[test]
    fn test_create() {
        let dir = TempDir::new().unwrap();
        let vfs = VirtualFileSystem::new(dir.path());

        let file = vfs.get("new/page.html");
        assert!(!file.exists());
        assert!(file.create().unwrap());
        assert!(file.exists());
        assert!(dir.path().join("new/page.html").is_file());
        assert!(!file.create().unwrap());

        let folder = vfs.get("data/cache/");
        assert!(folder.create().unwrap());
        assert!(dir.path().join("data/cache").is_dir());
    }

    #[test]
    fn test_equality_ignores_state() {
        let dir = fixture();
        let vfs = VirtualFileSystem::new(dir.path());
        let a = vfs.get("index.html");
        let b = vfs.get("/index.html");
        assert_eq!(a, b);
        assert!(a.same_instance(&b));
        assert_eq!(a.to_string(), "index.html");
    }
}
