// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The scoped lock-and-publish guard for one work item.
//!
//! ```text
//!  acquire ──lock──▶ check final ──non-empty──▶ Err(AlreadyComputed)   (pending removed)
//!                        │
//!                        ├──io error──────────▶ Err(CacheCorruption)   (pending removed)
//!                        ▼
//!                      Open ──save──▶ Saved ──finish/drop──▶ Published (rename)
//!                        │
//!                        └──finish/drop──────────────────────▶ Discarded (pending removed)
//! ```
//!
//! The lock is held until the guard goes away, so the rename or removal always
//! happens before any other worker can look at the entry.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::lock::{self, LockPolicy};
use super::paths::EntryPaths;
use crate::errors::CacheError;
use crate::model::{ResultRecord, WorkItem};
use crate::observability::messages::cache::{
    EntryAlreadyComputed, EntryCheckFailed, EntryCloseFailed, EntryDiscarded, EntryLocking,
    EntryPublished, EntrySaved,
};
use crate::observability::messages::StructuredLog;

/// How an entry's scope ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryCompletion {
    Published(PathBuf),
    Discarded,
}

/// Exclusive ownership of one work item's cache entry.
///
/// Obtained from [`ResultCache::acquire`](super::ResultCache::acquire). Call
/// [`save`](Self::save) to stage a record and [`finish`](Self::finish) to end
/// the scope. Dropping the guard without calling `finish` performs the same
/// transition and logs any error.
#[derive(Debug)]
pub struct CacheEntry {
    item: WorkItem,
    paths: EntryPaths,
    file: File,
    saved: bool,
    closed: bool,
}

impl CacheEntry {
    pub(crate) fn acquire(
        item: WorkItem,
        paths: EntryPaths,
        policy: LockPolicy,
    ) -> Result<Self, CacheError> {
        EntryLocking {
            item: &item,
            path: &paths.pending,
        }
        .log();

        let file = open_locked(&paths.pending, policy)?;

        // Whatever is in the file belongs to a worker that died mid-write.
        if let Err(e) = file.set_len(0) {
            remove_pending(&paths.pending);
            return Err(CacheError::io("truncate", &paths.pending, e));
        }

        match has_published_result(&paths.published) {
            Ok(false) => {}
            Ok(true) => {
                remove_pending(&paths.pending);
                EntryAlreadyComputed {
                    path: &paths.published,
                }
                .log();
                return Err(CacheError::AlreadyComputed {
                    path: paths.published,
                });
            }
            Err(source) => {
                remove_pending(&paths.pending);
                EntryCheckFailed {
                    path: &paths.published,
                    error: &source,
                }
                .log();
                return Err(CacheError::CacheCorruption {
                    path: paths.published,
                    source,
                });
            }
        }

        Ok(Self {
            item,
            paths,
            file,
            saved: false,
            closed: false,
        })
    }

    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    pub fn paths(&self) -> &EntryPaths {
        &self.paths
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Write `record` into the pending file, replacing anything saved before.
    ///
    /// The entry only counts as saved once the data has been synced; a failed
    /// save leaves it unsaved so that the scope ends in a discard.
    pub fn save(&mut self, record: &ResultRecord) -> Result<(), CacheError> {
        self.saved = false;
        let path = &self.paths.pending;

        self.file
            .set_len(0)
            .and_then(|_| (&self.file).seek(SeekFrom::Start(0)))
            .map_err(|e| CacheError::io("rewind", path, e))?;

        let mut writer = BufWriter::new(&self.file);
        serde_json::to_writer(&mut writer, record).map_err(|source| CacheError::Serialization {
            path: path.clone(),
            source,
        })?;
        writer
            .flush()
            .map_err(|e| CacheError::io("write", path, e))?;
        drop(writer);
        self.file
            .sync_all()
            .map_err(|e| CacheError::io("sync", path, e))?;

        EntrySaved {
            path,
            feature_count: record.len(),
        }
        .log();
        self.saved = true;
        Ok(())
    }

    /// End the scope: publish a saved record or discard the pending file.
    pub fn finish(mut self) -> Result<EntryCompletion, CacheError> {
        self.close()
    }

    /// Save `record` and publish it in one step.
    ///
    /// If saving fails the entry is discarded when it is dropped.
    pub fn publish(mut self, record: &ResultRecord) -> Result<PathBuf, CacheError> {
        self.save(record)?;
        self.closed = true;
        self.rename_into_place()
    }

    fn close(&mut self) -> Result<EntryCompletion, CacheError> {
        self.closed = true;
        if self.saved {
            self.rename_into_place().map(EntryCompletion::Published)
        } else {
            self.discard().map(|_| EntryCompletion::Discarded)
        }
    }

    fn discard(&mut self) -> Result<(), CacheError> {
        remove_file_if_exists(&self.paths.pending)
            .map_err(|e| CacheError::io("discard", &self.paths.pending, e))?;
        EntryDiscarded {
            path: &self.paths.pending,
        }
        .log();
        Ok(())
    }

    fn rename_into_place(&mut self) -> Result<PathBuf, CacheError> {
        if let Err(e) = fs::rename(&self.paths.pending, &self.paths.published) {
            remove_pending(&self.paths.pending);
            return Err(CacheError::io("publish", &self.paths.published, e));
        }
        EntryPublished {
            pending: &self.paths.pending,
            published: &self.paths.published,
        }
        .log();

        // The record is already visible; a failed directory sync only weakens
        // durability across power loss.
        if let Err(e) = sync_parent_dir(&self.paths.published) {
            tracing::warn!(
                path = %self.paths.published.display(),
                error = %e,
                "failed to sync cache directory after publish"
            );
        }

        Ok(self.paths.published.clone())
    }
}

impl Drop for CacheEntry {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.close() {
            EntryCloseFailed {
                path: &self.paths.pending,
                error: &e,
            }
            .log();
        }
        // Closing `file` after this releases the lock.
    }
}

/// Open `path` and lock it, retrying when the locked file turns out to have
/// been renamed or removed by the previous holder.
fn open_locked(path: &Path, policy: LockPolicy) -> Result<File, CacheError> {
    loop {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| CacheError::io("open", path, e))?;

        lock::lock_exclusive(&file, path, policy)?;

        if lock::is_same_file(&file, path).map_err(|e| CacheError::io("inspect", path, e))? {
            return Ok(file);
        }
        tracing::debug!(path = %path.display(), "pending file replaced while waiting, reopening");
    }
}

/// `Ok(true)` when `path` exists and is non-empty. Only "not found" counts as
/// absent; every other error is returned.
pub(crate) fn has_published_result(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.len() > 0),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Removal on an error path; the original error is what the caller sees.
fn remove_pending(path: &Path) {
    if let Err(e) = remove_file_if_exists(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove pending file");
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
