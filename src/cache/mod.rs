// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Filesystem-backed result cache shared by uncoordinated workers.
//!
//! Each work item owns two paths inside `<root>/<category>/`:
//!
//! * `image<id>-c<c>-z<z>-t<t>.tmp` - the pending file. Workers take an
//!   exclusive advisory lock on it for as long as they work on the item and
//!   write the record into it.
//! * `image<id>-c<c>-z<z>-t<t>.json` - the final file, created only by renaming
//!   a fully written pending file.
//!
//! A non-empty final file means the item is done. Because it only ever appears
//! through a rename, readers never observe a partial record, and because every
//! worker checks for it while holding the lock, at most one worker publishes
//! each item.
//!
//! # Examples
//!
//! ```
//! use plane_features::cache::{EntryCompletion, ResultCache};
//! use plane_features::model::{ResultRecord, WorkItem};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = tempfile::tempdir()?;
//! let cache = ResultCache::open(root.path(), "SmallFeatureSet")?;
//! let item = WorkItem { image_id: 1, channel: 0, z: 0, t: 0, width: 4, height: 4 };
//!
//! let mut entry = cache.acquire(&item)?;
//! entry.save(&ResultRecord::new(vec!["mean".into()], vec![2.5], "0")?)?;
//! assert!(matches!(entry.finish()?, EntryCompletion::Published(_)));
//!
//! // A second attempt fails fast without reaching the open state.
//! assert!(cache.acquire(&item).unwrap_err().is_already_computed());
//! # Ok(())
//! # }
//! ```

mod entry;
mod lock;
mod paths;
mod sweep;


use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use entry::{CacheEntry, EntryCompletion};
pub use lock::LockPolicy;
pub use paths::{file_stem, EntryPaths};
pub use sweep::SweepReport;

use crate::errors::CacheError;
use crate::model::{ResultRecord, WorkItem};

/// Handle on one category directory of the cache.
///
/// Cheap to clone; holds no open files. All locking happens per entry.
#[derive(Debug, Clone)]
pub struct ResultCache {
    directory: PathBuf,
    category: String,
    lock_policy: LockPolicy,
}

impl ResultCache {
    /// Open (creating if needed) `<root>/<category>` with the blocking lock policy.
    pub fn open(root: impl AsRef<Path>, category: &str) -> Result<Self, CacheError> {
        let directory = root.as_ref().join(category);
        fs::create_dir_all(&directory)
            .map_err(|e| CacheError::io("create directory", &directory, e))?;
        Ok(Self {
            directory,
            category: category.to_string(),
            lock_policy: LockPolicy::default(),
        })
    }

    pub fn with_lock_policy(mut self, lock_policy: LockPolicy) -> Self {
        self.lock_policy = lock_policy;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn lock_policy(&self) -> LockPolicy {
        self.lock_policy
    }

    pub fn paths(&self, item: &WorkItem) -> EntryPaths {
        EntryPaths::for_item(&self.directory, item)
    }

    /// Take exclusive ownership of `item`'s entry.
    ///
    /// Blocks according to the lock policy. Fails with
    /// [`CacheError::AlreadyComputed`] when a result is already published,
    /// without giving the caller a chance to compute anything.
    pub fn acquire(&self, item: &WorkItem) -> Result<CacheEntry, CacheError> {
        CacheEntry::acquire(*item, self.paths(item), self.lock_policy)
    }

    /// Whether a non-empty result has been published for `item`.
    pub fn is_published(&self, item: &WorkItem) -> Result<bool, CacheError> {
        let path = self.paths(item).published;
        entry::has_published_result(&path)
            .map_err(|source| CacheError::CacheCorruption { path, source })
    }

    /// Read back a published record. Unpublished items yield `Ok(None)`.
    pub fn read(&self, item: &WorkItem) -> Result<Option<ResultRecord>, CacheError> {
        let path = self.paths(item).published;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io("read", path, e)),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CacheError::Serialization { path, source })
    }

    /// Remove pending files older than `max_age` that no live worker holds.
    pub fn sweep_orphans(&self, max_age: Duration) -> Result<SweepReport, CacheError> {
        sweep::sweep(&self.directory, max_age)
    }
}
