//! Path string normalization.
//!
//! Every [`VirtualPath`](super::VirtualPath) is keyed by its normalized form:
//! `/`-separated, no leading separator, and a trailing separator exactly
//! when the path is a folder. The root folder is the empty string.

use std::path::{Path, PathBuf};

/// Normalize a root directory to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn absolute_root(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Normalize a raw relative path into its canonical key.
///
/// - `\` is treated as `/`
/// - empty and `.` segments are dropped
/// - `..` pops the previous segment and never escapes the root
/// - folders get a trailing `/` (except the root, which is `""`)
pub fn normalize(raw: &str, is_folder: bool) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut path = segments.join("/");
    if is_folder && !path.is_empty() {
        path.push('/');
    }
    path
}

/// Join a normalized folder key with a raw child segment.
#[inline]
pub fn join(parent: &str, raw: &str) -> String {
    let mut joined = String::with_capacity(parent.len() + raw.len());
    joined.push_str(parent);
    joined.push_str(raw.trim_start_matches(['/', '\\']));
    joined
}

/// Whether the raw segment explicitly names a folder.
#[inline]
pub fn has_trailing_separator(raw: &str) -> bool {
    raw.ends_with(['/', '\\'])
}

/// The last segment of a normalized key, without trailing separator.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Whether the last segment looks like a file (contains a `.`).
#[inline]
pub fn looks_like_file(path: &str) -> bool {
    file_name(path).contains('.')
}
