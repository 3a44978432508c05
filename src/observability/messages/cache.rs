// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for result cache events.
//!
//! This module contains message types for logging events related to:
//! * Pending file locking
//! * Checking for results published by other workers
//! * Publishing and discarding entries
//! * Sweeping orphaned pending files

use std::fmt::{Display, Formatter};
use std::path::Path;

use tracing::Span;

use super::StructuredLog;
use crate::model::WorkItem;

/// About to lock a pending file.
///
/// # Log Level
/// `debug!` - May block for as long as another worker holds the entry
pub struct EntryLocking<'a> {
    pub item: &'a WorkItem,
    pub path: &'a Path,
}

impl Display for EntryLocking<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Locking: {}", self.path.display())
    }
}

impl StructuredLog for EntryLocking<'_> {
    fn log(&self) {
        tracing::debug!(
            image_id = self.item.image_id,
            channel = self.item.channel,
            z = self.item.z,
            t = self.item.t,
            path = %self.path.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "cache_entry",
            span_name = name,
            image_id = self.item.image_id,
            channel = self.item.channel,
            z = self.item.z,
            t = self.item.t,
        )
    }
}

/// Another worker already published this entry.
///
/// # Log Level
/// `info!` - Expected when several workers share a work list
///
/// # Example
/// ```
/// use plane_features::observability::messages::cache::EntryAlreadyComputed;
/// use std::path::Path;
///
/// let msg = EntryAlreadyComputed {
///     path: Path::new("SmallFeatureSet/image00000001-c0-z0-t0.json"),
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Feature file already exists: SmallFeatureSet/image00000001-c0-z0-t0.json"
/// );
/// ```
pub struct EntryAlreadyComputed<'a> {
    pub path: &'a Path,
}

impl Display for EntryAlreadyComputed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Feature file already exists: {}", self.path.display())
    }
}

impl StructuredLog for EntryAlreadyComputed<'_> {
    fn log(&self) {
        tracing::info!(path = %self.path.display(), "{}", self);
    }
}

/// The final path could not be inspected.
///
/// # Log Level
/// `error!` - The attempt is abandoned and the pending file removed
pub struct EntryCheckFailed<'a> {
    pub path: &'a Path,
    pub error: &'a dyn std::error::Error,
}

impl Display for EntryCheckFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Checking {} failed, abandoning entry: {}",
            self.path.display(),
            self.error
        )
    }
}

impl StructuredLog for EntryCheckFailed<'_> {
    fn log(&self) {
        tracing::error!(
            path = %self.path.display(),
            error = %self.error,
            "{}", self
        );
    }
}

/// A record was written to the pending file.
///
/// # Log Level
/// `debug!`
pub struct EntrySaved<'a> {
    pub path: &'a Path,
    pub feature_count: usize,
}

impl Display for EntrySaved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Saving: {} ({} features)",
            self.path.display(),
            self.feature_count
        )
    }
}

impl StructuredLog for EntrySaved<'_> {
    fn log(&self) {
        tracing::debug!(
            path = %self.path.display(),
            feature_count = self.feature_count,
            "{}", self
        );
    }
}

/// The pending file was renamed to its final path.
///
/// # Log Level
/// `info!` - One per computed plane
pub struct EntryPublished<'a> {
    pub pending: &'a Path,
    pub published: &'a Path,
}

impl Display for EntryPublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Renaming: {}->{}",
            self.pending.display(),
            self.published.display()
        )
    }
}

impl StructuredLog for EntryPublished<'_> {
    fn log(&self) {
        tracing::info!(
            pending = %self.pending.display(),
            published = %self.published.display(),
            "{}", self
        );
    }
}

/// Scope ended without a saved record; the pending file was removed.
///
/// # Log Level
/// `debug!`
pub struct EntryDiscarded<'a> {
    pub path: &'a Path,
}

impl Display for EntryDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Empty, deleting: {}", self.path.display())
    }
}

impl StructuredLog for EntryDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(path = %self.path.display(), "{}", self);
    }
}

/// Publishing or discarding failed while the entry was being dropped.
///
/// # Log Level
/// `error!` - The error has no caller left to receive it
pub struct EntryCloseFailed<'a> {
    pub path: &'a Path,
    pub error: &'a dyn std::error::Error,
}

impl Display for EntryCloseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to close cache entry {}: {}",
            self.path.display(),
            self.error
        )
    }
}

impl StructuredLog for EntryCloseFailed<'_> {
    fn log(&self) {
        tracing::error!(
            path = %self.path.display(),
            error = %self.error,
            "{}", self
        );
    }
}

/// An unlocked, stale pending file was removed.
///
/// # Log Level
/// `info!`
pub struct OrphanRemoved<'a> {
    pub path: &'a Path,
    pub age: std::time::Duration,
}

impl Display for OrphanRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Removed orphaned pending file {} (age {:?})",
            self.path.display(),
            self.age
        )
    }
}

impl StructuredLog for OrphanRemoved<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            age_secs = self.age.as_secs(),
            "{}", self
        );
    }
}

/// Orphan sweep finished.
///
/// # Log Level
/// `info!`
pub struct SweepCompleted<'a> {
    pub directory: &'a Path,
    pub removed: usize,
    pub in_use: usize,
    pub recent: usize,
}

impl Display for SweepCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Swept {}: removed={}, in_use={}, too_recent={}",
            self.directory.display(),
            self.removed,
            self.in_use,
            self.recent
        )
    }
}

impl StructuredLog for SweepCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            directory = %self.directory.display(),
            removed = self.removed,
            in_use = self.in_use,
            recent = self.recent,
            "{}", self
        );
    }
}
