//! I/O failure policy.

use std::path::Path;

use crate::error::{FileError, FileResult};

/// How content reads report I/O failures.
///
/// The serving layer favors availability: by default a failing read is
/// logged and answered with an empty result. `Strict` hands the error to
/// the caller instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IoPolicy {
    /// Log the failure and return the degraded value.
    #[default]
    Degrade,
    /// Propagate the failure as a [`FileError`].
    Strict,
}

impl IoPolicy {
    /// Apply the policy to the outcome of an I/O operation on `path`.
    ///
    /// `fallback` produces the degraded value.
    pub fn apply<T>(
        self,
        path: &Path,
        result: std::io::Result<T>,
        fallback: impl FnOnce() -> T,
    ) -> FileResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(error) => self.recover(FileError::from_io(error, path), fallback),
        }
    }

    /// Apply the policy to an already classified error.
    pub fn recover<T>(self, error: FileError, fallback: impl FnOnce() -> T) -> FileResult<T> {
        match self {
            Self::Degrade => {
                tracing::warn!(path = %error.path().display(), %error, "degrading failed file access");
                Ok(fallback())
            }
            Self::Strict => Err(error),
        }
    }

    /// Whether failures are propagated.
    #[inline]
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}
