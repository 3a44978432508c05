// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;

use super::lock;
use crate::config::consts::PENDING_EXTENSION;
use crate::errors::CacheError;
use crate::observability::messages::cache::{OrphanRemoved, SweepCompleted};
use crate::observability::messages::StructuredLog;

/// What an orphan sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    /// Pending files currently locked by a live worker.
    pub in_use: usize,
    /// Unlocked pending files younger than the age threshold.
    pub recent: usize,
}

/// Removes pending files left behind by workers that died between locking and
/// publishing. A file is only removed while the sweeper itself holds its lock,
/// so a worker that opened it in the meantime notices the removal on wake-up
/// and reopens the path.
pub(crate) fn sweep(directory: &Path, max_age: Duration) -> Result<SweepReport, CacheError> {
    let mut report = SweepReport::default();
    let entries =
        fs::read_dir(directory).map_err(|e| CacheError::io("list", directory, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| CacheError::io("list", directory, e))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(PENDING_EXTENSION) {
            continue;
        }

        let age = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified.elapsed().unwrap_or(Duration::ZERO),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(CacheError::io("inspect", &path, e)),
        };
        if age < max_age {
            report.recent += 1;
            continue;
        }

        let file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(CacheError::io("open", &path, e)),
        };
        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if lock::is_contended(&e) => {
                report.in_use += 1;
                continue;
            }
            Err(source) => return Err(CacheError::LockAcquisitionFailed { path, source }),
        }
        if !lock::is_same_file(&file, &path).map_err(|e| CacheError::io("inspect", &path, e))? {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(CacheError::io("remove", &path, e)),
        }
        OrphanRemoved { path: &path, age }.log();
        report.removed.push(path);
    }

    SweepCompleted {
        directory,
        removed: report.removed.len(),
        in_use: report.in_use,
        recent: report.recent,
    }
    .log();
    Ok(report)
}
