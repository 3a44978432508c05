// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Advisory lock helpers for pending files.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::errors::CacheError;

/// How long a worker is prepared to wait for another worker's lock.
///
/// A crashed worker's lock is released by the OS, so `Blocking` never waits
/// on a dead process; it does wait for as long as a live holder keeps
/// computing. Workers that would rather skip busy items use `NonBlocking` or
/// bound the wait with `Timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// Wait until the lock is free.
    #[default]
    Blocking,
    /// Fail immediately if another worker holds the lock.
    NonBlocking,
    /// Poll every `poll_interval` until `timeout` has elapsed.
    Timeout {
        timeout: Duration,
        poll_interval: Duration,
    },
}

pub(crate) fn lock_exclusive(file: &File, path: &Path, policy: LockPolicy) -> Result<(), CacheError> {
    let failed = |source| CacheError::LockAcquisitionFailed {
        path: path.to_path_buf(),
        source,
    };

    match policy {
        LockPolicy::Blocking => file.lock_exclusive().map_err(failed),
        LockPolicy::NonBlocking => file.try_lock_exclusive().map_err(failed),
        LockPolicy::Timeout {
            timeout,
            poll_interval,
        } => {
            let deadline = Instant::now() + timeout;
            loop {
                match file.try_lock_exclusive() {
                    Ok(()) => return Ok(()),
                    Err(e) if is_contended(&e) => {
                        let now = Instant::now();
                        if now >= deadline {
                            return Err(failed(io::Error::new(
                                io::ErrorKind::TimedOut,
                                format!("lock still held after {:?}", timeout),
                            )));
                        }
                        std::thread::sleep(poll_interval.min(deadline - now));
                    }
                    Err(e) => return Err(failed(e)),
                }
            }
        }
    }
}

pub(crate) fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Whether `file` is still the file found at `path`.
///
/// A worker blocked on a lock may wake up holding a file that the previous
/// holder has since renamed or unlinked. Locking that orphaned inode protects
/// nothing, so callers reopen the path when this returns `false`.
#[cfg(unix)]
pub(crate) fn is_same_file(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match std::fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

// Windows refuses to rename or delete files that are open elsewhere, so the
// locked handle always refers to the current path.
#[cfg(not(unix))]
pub(crate) fn is_same_file(_file: &File, path: &Path) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;

    fn open(path: &Path) -> File {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .unwrap()
    }

    #[test]
    fn non_blocking_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("held.tmp");
        let holder = open(&path);
        holder.lock_exclusive().unwrap();

        let contender = open(&path);
        let err = lock_exclusive(&contender, &path, LockPolicy::NonBlocking).unwrap_err();
        match err {
            CacheError::LockAcquisitionFailed { source, .. } => assert!(is_contended(&source)),
            other => panic!("expected LockAcquisitionFailed, got {other:?}"),
        }

        drop(holder);
        lock_exclusive(&contender, &path, LockPolicy::NonBlocking).unwrap();
    }

    #[test]
    fn timeout_expires_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("held.tmp");
        let holder = open(&path);
        holder.lock_exclusive().unwrap();

        let contender = open(&path);
        let policy = LockPolicy::Timeout {
            timeout: Duration::from_millis(60),
            poll_interval: Duration::from_millis(10),
        };
        let started = Instant::now();
        let err = lock_exclusive(&contender, &path, policy).unwrap_err();
        assert!(started.elapsed() >= Duration::from_millis(60));
        match err {
            CacheError::LockAcquisitionFailed { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::TimedOut)
            }
            other => panic!("expected LockAcquisitionFailed, got {other:?}"),
        }
    }

    #[test]
    fn timeout_succeeds_once_released() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("held.tmp");
        let holder = open(&path);
        holder.lock_exclusive().unwrap();

        let release = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            drop(holder);
        });

        let contender = open(&path);
        let policy = LockPolicy::Timeout {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(5),
        };
        lock_exclusive(&contender, &path, policy).unwrap();
        release.join().unwrap();
    }

    #[test]
    fn detects_replaced_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry.tmp");
        let file = open(&path);
        assert!(is_same_file(&file, &path).unwrap());

        std::fs::remove_file(&path).unwrap();
        assert!(!is_same_file(&file, &path).unwrap());

        let _replacement = open(&path);
        #[cfg(unix)]
        assert!(!is_same_file(&file, &path).unwrap());
    }
}
