// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for calculation runs.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, cancellation, completion)
//! * Root resolution and hierarchy walking
//! * Per-plane extraction failures

use std::fmt::{Display, Formatter};

use tracing::Span;

use super::StructuredLog;
use crate::errors::FailureKind;
use crate::model::{ObjectRef, WorkItem};

/// Calculator run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use plane_features::observability::messages::calculator::RunStarted;
///
/// let msg = RunStarted {
///     extractor: "mean_intensity",
///     root_count: 3,
///     category: "SmallFeatureSet",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Starting feature calculation with mean_intensity: 3 roots into 'SmallFeatureSet'"
/// );
/// ```
pub struct RunStarted<'a> {
    pub extractor: &'a str,
    pub root_count: usize,
    pub category: &'a str,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting feature calculation with {}: {} roots into '{}'",
            self.extractor, self.root_count, self.category
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            extractor = self.extractor,
            root_count = self.root_count,
            category = self.category,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "calculation",
            span_name = name,
            extractor = self.extractor,
            category = self.category,
        )
    }
}

/// Calculator started on an explicit item list, e.g. one batch of a plan.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use plane_features::observability::messages::calculator::ItemsRunStarted;
///
/// let msg = ItemsRunStarted {
///     extractor: "mean_intensity",
///     items: 12,
///     category: "SmallFeatureSet",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Starting feature calculation with mean_intensity: 12 planes into 'SmallFeatureSet'"
/// );
/// ```
pub struct ItemsRunStarted<'a> {
    pub extractor: &'a str,
    pub items: usize,
    pub category: &'a str,
}

impl Display for ItemsRunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting feature calculation with {}: {} planes into '{}'",
            self.extractor, self.items, self.category
        )
    }
}

impl StructuredLog for ItemsRunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            extractor = self.extractor,
            items = self.items,
            category = self.category,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "calculation",
            span_name = name,
            extractor = self.extractor,
            category = self.category,
            items = self.items,
        )
    }
}

/// A root could not be resolved or one of its containers could not be listed.
///
/// # Log Level
/// `error!` - The root's items are skipped, the run continues
pub struct RootUnresolved<'a> {
    pub root: &'a ObjectRef,
    pub error: &'a dyn std::error::Error,
}

impl Display for RootUnresolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping root {}: {}", self.root, self.error)
    }
}

impl StructuredLog for RootUnresolved<'_> {
    fn log(&self) {
        tracing::error!(root = %self.root, error = %self.error, "{}", self);
    }
}

/// A plane failed; its cache entry was discarded.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PlaneFailed<'a> {
    pub item: &'a WorkItem,
    pub kind: FailureKind,
    pub error: &'a dyn std::error::Error,
}

impl Display for PlaneFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Plane {} failed ({}): {}", self.item, self.kind, self.error)
    }
}

impl StructuredLog for PlaneFailed<'_> {
    fn log(&self) {
        tracing::error!(
            image_id = self.item.image_id,
            channel = self.item.channel,
            z = self.item.z,
            t = self.item.t,
            kind = %self.kind,
            error = %self.error,
            "{}", self
        );
    }
}

/// Run stopped early on request.
///
/// # Log Level
/// `warn!` - Remaining items were not attempted
pub struct RunCancelled {
    pub processed: usize,
}

impl Display for RunCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Feature calculation cancelled after {} items",
            self.processed
        )
    }
}

impl StructuredLog for RunCancelled {
    fn log(&self) {
        tracing::warn!(processed = self.processed, "{}", self);
    }
}

/// Run finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunCompleted {
    pub published: usize,
    pub already_computed: usize,
    pub failed: usize,
    pub duration: std::time::Duration,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Feature calculation completed in {:?}: published={}, already_computed={}, failed={}",
            self.duration, self.published, self.already_computed, self.failed
        )
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        tracing::info!(
            published = self.published,
            already_computed = self.already_computed,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}
