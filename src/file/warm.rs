//! Parallel content-cache warm-up.
//!
//! Walks a folder tree once and reads every text file through
//! [`VirtualPath::read_text`] so the first requests after startup are
//! served from the cache. Binary files are left on disk.

use rayon::prelude::*;

use super::path::VirtualPath;
use super::system::VirtualFileSystem;
use crate::response::content_type_for;

impl VirtualFileSystem {
    /// Read every text file below `dir` into the content cache in parallel.
    ///
    /// Returns the number of files now held in the content cache. Binary
    /// files are skipped. Failed reads follow the configured
    /// [`IoPolicy`](super::IoPolicy) and are not counted.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use virtual_serve::file::VirtualFileSystem;
    ///
    /// let vfs = VirtualFileSystem::new("public");
    /// let loaded = vfs.warm(&vfs.root());
    /// println!("cached {loaded} files");
    /// ```
    pub fn warm(&self, dir: &VirtualPath) -> usize {
        let mut files = Vec::new();
        collect_files(dir, &mut files);

        let loaded = files
            .par_iter()
            .filter(|path| content_type_for(path.extension()).1)
            .filter(|path| path.read_text().is_ok() && path.is_cached())
            .count();

        tracing::debug!(root = %dir, files = files.len(), loaded, "warmed content cache");
        loaded
    }
}

fn collect_files(dir: &VirtualPath, files: &mut Vec<VirtualPath>) {
    let mut pending = vec![dir.clone()];
    while let Some(folder) = pending.pop() {
        for child in folder.children(true) {
            if child.is_folder() {
                pending.push(child);
            } else {
                files.push(child);
            }
        }
    }
}
