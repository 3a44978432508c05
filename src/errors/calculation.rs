// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced as per-item outcomes of a calculation run.

use std::fmt;

use thiserror::Error;

use super::{CacheError, RecordError, RepositoryError};
use crate::model::ObjectRef;

/// Failure of a single work item or root. None of these abort a run; the
/// calculator reports them as outcomes and moves on.
#[derive(Debug, Error)]
pub enum CalculationError {
    /// A root `(kind, id)` could not be resolved by the repository.
    #[error("unable to get object: {object}")]
    ObjectNotFound { object: ObjectRef },

    /// The extractor was given an image id the repository does not know.
    #[error("image id not found: {image_id}")]
    ImageNotFound { image_id: i64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("extractor '{extractor}' failed: {message}")]
    Extraction {
        extractor: &'static str,
        message: String,
    },

    /// An extractor produced names and values of different lengths.
    #[error("extractor produced an invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// The blocking task driving a cache operation panicked or was cancelled.
    #[error("cache worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Coarse classification of a [`CalculationError`], used for summaries and
/// log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ObjectNotFound,
    ImageNotFound,
    Repository,
    AlreadyComputed,
    LockAcquisitionFailed,
    CacheCorruption,
    CacheIo,
    Extraction,
    Worker,
}

impl CalculationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CalculationError::ObjectNotFound { .. } => FailureKind::ObjectNotFound,
            CalculationError::ImageNotFound { .. } => FailureKind::ImageNotFound,
            CalculationError::Repository(_) => FailureKind::Repository,
            CalculationError::Cache(err) => match err {
                CacheError::AlreadyComputed { .. } => FailureKind::AlreadyComputed,
                CacheError::LockAcquisitionFailed { .. } => FailureKind::LockAcquisitionFailed,
                CacheError::CacheCorruption { .. } => FailureKind::CacheCorruption,
                CacheError::Io { .. } | CacheError::Serialization { .. } | CacheError::Record(_) => {
                    FailureKind::CacheIo
                }
            },
            CalculationError::Extraction { .. } | CalculationError::InvalidRecord(_) => {
                FailureKind::Extraction
            }
            CalculationError::Worker(_) => FailureKind::Worker,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::ObjectNotFound => "object_not_found",
            FailureKind::ImageNotFound => "image_not_found",
            FailureKind::Repository => "repository",
            FailureKind::AlreadyComputed => "already_computed",
            FailureKind::LockAcquisitionFailed => "lock_acquisition_failed",
            FailureKind::CacheCorruption => "cache_corruption",
            FailureKind::CacheIo => "cache_io",
            FailureKind::Extraction => "extraction",
            FailureKind::Worker => "worker",
        };
        f.write_str(label)
    }
}
