//! Error types for file access and response snapshots.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Result type for file operations on a [`VirtualPath`](crate::file::VirtualPath).
pub type FileResult<T> = Result<T, FileError>;

/// Error raised by file reads when the file system runs with
/// [`IoPolicy::Strict`](crate::file::IoPolicy::Strict).
///
/// Under the default degrade policy these errors are logged and replaced
/// with an empty result instead of being returned.
#[derive(Debug, Error)]
pub enum FileError {
    /// The backing file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A file operation was attempted on a directory.
    #[error("is a directory: {}", .0.display())]
    IsDirectory(PathBuf),

    /// The file is not valid UTF-8 text.
    #[error("file is not valid utf-8: {}", .0.display())]
    InvalidUtf8(PathBuf),

    /// Underlying I/O failure.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(error: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::IsADirectory => Self::IsDirectory(path),
            std::io::ErrorKind::InvalidData => Self::InvalidUtf8(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// The path this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::IsDirectory(path) | Self::InvalidUtf8(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}

/// Error when building a [`CachedResponse`](crate::cache::CachedResponse).
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The source body does not expose a known-length stream.
    ///
    /// This is a contract violation by the caller, not a transient failure.
    #[error("response {id} does not have a known length response stream")]
    UnknownLength {
        /// Identifier the snapshot would have carried.
        id: Uuid,
    },
}

/// Any failure while producing a response from a [`VirtualPath`](crate::file::VirtualPath).
///
/// Convenient as the error type of
/// [`ResponseCache::get_or_try_insert_with`](crate::cache::ResponseCache::get_or_try_insert_with).
#[derive(Debug, Error)]
pub enum ServeError {
    /// Reading the file failed.
    #[error(transparent)]
    File(#[from] FileError),

    /// Freezing the response failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
