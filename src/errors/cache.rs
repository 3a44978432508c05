// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for result cache entries.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::RecordError;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The final path already holds a non-empty result. This is the normal
    /// deduplication signal, not a system failure.
    #[error("feature file already exists: {}", .path.display())]
    AlreadyComputed { path: PathBuf },

    /// The lock primitive refused the lock for a reason other than ordinary
    /// blocking: contention in non-blocking mode, an expired timeout, or an
    /// OS-level failure.
    #[error("failed to lock {}: {source}", .path.display())]
    LockAcquisitionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Checking the final path failed with something other than "not found".
    #[error("unable to inspect {}: {source}", .path.display())]
    CacheCorruption {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed feature file {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl CacheError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// True when the entry was skipped because another worker already
    /// published it.
    pub fn is_already_computed(&self) -> bool {
        matches!(self, CacheError::AlreadyComputed { .. })
    }
}
