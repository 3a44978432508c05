// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::{CalculationError, FailureKind};
use crate::model::{ObjectRef, WorkItem};

/// What a failure is about: one plane, or a root whose planes could not be
/// enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Plane(WorkItem),
    Object(ObjectRef),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Plane(item) => write!(f, "{}", item),
            Subject::Object(object) => write!(f, "{}", object),
        }
    }
}

/// Result of one unit of work in a run.
#[derive(Debug)]
pub enum Outcome {
    /// This worker computed the plane and published it at `path`.
    Published { item: WorkItem, path: PathBuf },
    /// Another worker (or an earlier run) already published the plane.
    AlreadyComputed { item: WorkItem },
    Failed {
        subject: Subject,
        error: CalculationError,
    },
}

impl Outcome {
    /// The plane this outcome is about, if it is about a plane.
    pub fn item(&self) -> Option<&WorkItem> {
        match self {
            Outcome::Published { item, .. } | Outcome::AlreadyComputed { item } => Some(item),
            Outcome::Failed {
                subject: Subject::Plane(item),
                ..
            } => Some(item),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Outcome::Published { .. })
    }

    pub fn is_already_computed(&self) -> bool {
        matches!(self, Outcome::AlreadyComputed { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Failed { error, .. } => Some(error.kind()),
            _ => None,
        }
    }
}

/// Outcome counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub published: usize,
    pub already_computed: usize,
    pub failed: usize,
    pub failures: HashMap<FailureKind, usize>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Published { .. } => self.published += 1,
            Outcome::AlreadyComputed { .. } => self.already_computed += 1,
            Outcome::Failed { error, .. } => {
                self.failed += 1;
                *self.failures.entry(error.kind()).or_insert(0) += 1;
            }
        }
    }

    pub fn total(&self) -> usize {
        self.published + self.already_computed + self.failed
    }

    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "published={} already_computed={} failed={}",
            self.published, self.already_computed, self.failed
        )
    }
}

/// Outcomes of a run, in processing order.
///
/// The run executes on a background task and produces at most one outcome
/// ahead of the consumer. Dropping the stream stops the run after the item in
/// flight.
pub struct OutcomeStream {
    receiver: mpsc::Receiver<Outcome>,
    task: JoinHandle<()>,
}

impl OutcomeStream {
    pub(crate) fn new(receiver: mpsc::Receiver<Outcome>, task: JoinHandle<()>) -> Self {
        Self { receiver, task }
    }

    /// Next outcome, or `None` once the run is over.
    pub async fn next(&mut self) -> Option<Outcome> {
        self.receiver.recv().await
    }

    /// Drain the remaining outcomes.
    pub async fn collect(mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next().await {
            outcomes.push(outcome);
        }
        self.join().await;
        outcomes
    }

    /// Drain the remaining outcomes, keeping only their counts.
    pub async fn summarize(mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        while let Some(outcome) = self.next().await {
            summary.record(&outcome);
        }
        self.join().await;
        summary
    }

    async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "calculation task ended abnormally");
        }
    }
}
