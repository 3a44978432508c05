// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use super::outcome::{Outcome, OutcomeStream, RunSummary, Subject};
use crate::cache::{CacheEntry, ResultCache};
use crate::errors::{CacheError, CalculationError};
use crate::model::{ObjectRef, WorkItem};
use crate::observability::messages::cache::EntryCloseFailed;
use crate::observability::messages::calculator::{
    ItemsRunStarted, PlaneFailed, RootUnresolved, RunCancelled, RunCompleted, RunStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{FeatureExtractor, Node, Repository};
use crate::work::{planes, walk, WorkPlan};

/// Drives feature extraction over a repository hierarchy into a result cache.
///
/// Each plane goes through the same cycle: take the cache entry (skipping the
/// plane if it is already published), have the extractor fetch and compute,
/// then publish the record. Failures are reported per plane and never stop the
/// run, so any number of independent workers can run the same roots against a
/// shared cache directory and every plane is computed exactly once.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use plane_features::backends::local::LocalExtractorFactory;
/// use plane_features::backends::memory::{InMemoryRepository, MemoryObject};
/// use plane_features::cache::ResultCache;
/// use plane_features::engine::Calculator;
/// use plane_features::model::ObjectRef;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = InMemoryRepository::from_objects(vec![MemoryObject::image(1, 4, 4, 2, 1, 1)])?;
/// let dir = tempfile::tempdir()?;
/// let cache = ResultCache::open(dir.path(), "SmallFeatureSet")?;
/// let extractor = LocalExtractorFactory::create_extractor("mean_intensity")?;
///
/// let calculator = Calculator::new(Arc::new(repository), cache);
/// let summary = calculator
///     .run(vec![ObjectRef::image(1)], extractor)
///     .summarize()
///     .await;
///
/// assert_eq!(summary.published, 2);
/// # Ok(())
/// # }
/// ```
pub struct Calculator {
    repository: Arc<dyn Repository>,
    cache: ResultCache,
    span: Span,
    cancellation: CancellationToken,
}

impl Calculator {
    pub fn new(repository: Arc<dyn Repository>, cache: ResultCache) -> Self {
        let span = tracing::info_span!("calculator", category = cache.category());
        Self {
            repository,
            cache,
            span,
            cancellation: CancellationToken::new(),
        }
    }

    /// Use `span` as the parent of every run's span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Share an existing token, e.g. one cancelled by a signal handler.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Cancelling this token stops runs before their next plane.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    /// Walk `roots` and process every plane below them, in order.
    ///
    /// A root that cannot be resolved yields one `Failed` outcome with
    /// [`Subject::Object`] and the run moves on to the next root.
    pub fn run(&self, roots: Vec<ObjectRef>, extractor: Arc<dyn FeatureExtractor>) -> OutcomeStream {
        let started = RunStarted {
            extractor: extractor.name(),
            root_count: roots.len(),
            category: self.cache.category(),
        };
        let span = self.span.in_scope(|| started.span("run"));
        span.in_scope(|| started.log());

        let (tx, rx) = mpsc::channel(1);
        let context = self.context(extractor);
        let task = tokio::spawn(async move { context.run_roots(roots, tx).await }.instrument(span));
        OutcomeStream::new(rx, task)
    }

    /// Process an explicit list of planes, e.g. one batch of a [`WorkPlan`].
    pub fn run_items(
        &self,
        items: Vec<WorkItem>,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> OutcomeStream {
        let started = ItemsRunStarted {
            extractor: extractor.name(),
            items: items.len(),
            category: self.cache.category(),
        };
        let span = self.span.in_scope(|| started.span("run_items"));
        span.in_scope(|| started.log());

        let (tx, rx) = mpsc::channel(1);
        let context = self.context(extractor);
        let task = tokio::spawn(async move { context.run_items(items, tx).await }.instrument(span));
        OutcomeStream::new(rx, task)
    }

    /// Enumerate every plane below `roots` without processing anything.
    pub async fn plan(&self, roots: &[ObjectRef]) -> WorkPlan {
        let mut plan = WorkPlan::default();
        for root in roots {
            let node = match resolve(self.repository.as_ref(), *root).await {
                Ok(node) => node,
                Err(error) => {
                    plan.push_unresolved(*root, error);
                    continue;
                }
            };
            let mut walker = walk(vec![node]);
            while let Some(next) = walker.next().await {
                match next {
                    Ok(image) => {
                        for item in planes::enumerate(image.as_ref()) {
                            plan.push_item(item);
                        }
                    }
                    Err(error) => plan.push_unresolved(*root, error.into()),
                }
            }
        }
        plan
    }

    /// Run the full cycle for a single plane on the current task.
    pub async fn process_item(
        &self,
        item: WorkItem,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Outcome {
        self.context(extractor)
            .process(item)
            .instrument(self.span.clone())
            .await
    }

    fn context(&self, extractor: Arc<dyn FeatureExtractor>) -> RunContext {
        RunContext {
            repository: Arc::clone(&self.repository),
            cache: self.cache.clone(),
            extractor,
            cancellation: self.cancellation.clone(),
        }
    }
}

/// Owned state of one run, moved onto the run's task.
struct RunContext {
    repository: Arc<dyn Repository>,
    cache: ResultCache,
    extractor: Arc<dyn FeatureExtractor>,
    cancellation: CancellationToken,
}

/// Progress of a run, logged at the end.
struct Progress {
    summary: RunSummary,
    started: Instant,
}

impl Progress {
    fn new() -> Self {
        Self {
            summary: RunSummary::default(),
            started: Instant::now(),
        }
    }

    fn cancelled(&self) {
        RunCancelled {
            processed: self.summary.total(),
        }
        .log();
    }

    fn completed(&self) {
        RunCompleted {
            published: self.summary.published,
            already_computed: self.summary.already_computed,
            failed: self.summary.failed,
            duration: self.started.elapsed(),
        }
        .log();
    }
}

impl RunContext {
    async fn run_roots(self, roots: Vec<ObjectRef>, tx: mpsc::Sender<Outcome>) {
        let mut progress = Progress::new();

        'roots: for root in roots {
            if self.cancellation.is_cancelled() {
                progress.cancelled();
                break;
            }

            let node = match resolve(self.repository.as_ref(), root).await {
                Ok(node) => node,
                Err(error) => {
                    RootUnresolved {
                        root: &root,
                        error: &error,
                    }
                    .log();
                    let outcome = Outcome::Failed {
                        subject: Subject::Object(root),
                        error,
                    };
                    if !emit(&tx, &mut progress, outcome).await {
                        return;
                    }
                    continue;
                }
            };

            let mut walker = walk(vec![node]);
            while let Some(next) = walker.next().await {
                let image = match next {
                    Ok(image) => image,
                    Err(error) => {
                        let error = CalculationError::from(error);
                        RootUnresolved {
                            root: &root,
                            error: &error,
                        }
                        .log();
                        let outcome = Outcome::Failed {
                            subject: Subject::Object(root),
                            error,
                        };
                        if !emit(&tx, &mut progress, outcome).await {
                            return;
                        }
                        continue;
                    }
                };

                for item in planes::enumerate(image.as_ref()) {
                    if self.cancellation.is_cancelled() {
                        progress.cancelled();
                        break 'roots;
                    }
                    let outcome = self.process(item).await;
                    if !emit(&tx, &mut progress, outcome).await {
                        return;
                    }
                }
            }
        }

        progress.completed();
    }

    async fn run_items(self, items: Vec<WorkItem>, tx: mpsc::Sender<Outcome>) {
        let mut progress = Progress::new();

        for item in items {
            if self.cancellation.is_cancelled() {
                progress.cancelled();
                break;
            }
            let outcome = self.process(item).await;
            if !emit(&tx, &mut progress, outcome).await {
                return;
            }
        }

        progress.completed();
    }

    async fn process(&self, item: WorkItem) -> Outcome {
        match self.try_process(item).await {
            Ok(path) => Outcome::Published { item, path },
            Err(CalculationError::Cache(CacheError::AlreadyComputed { .. })) => {
                Outcome::AlreadyComputed { item }
            }
            Err(error) => {
                PlaneFailed {
                    item: &item,
                    kind: error.kind(),
                    error: &error,
                }
                .log();
                Outcome::Failed {
                    subject: Subject::Plane(item),
                    error,
                }
            }
        }
    }

    async fn try_process(&self, item: WorkItem) -> Result<PathBuf, CalculationError> {
        let cache = self.cache.clone();
        let entry = tokio::task::spawn_blocking(move || cache.acquire(&item)).await??;

        let record = match self
            .extractor
            .extract(self.repository.as_ref(), item.image_id, item.plane())
            .await
        {
            Ok(record) => record,
            Err(error) => {
                discard(entry).await;
                return Err(error);
            }
        };

        let path = tokio::task::spawn_blocking(move || entry.publish(&record)).await??;
        Ok(path)
    }
}

/// Remove an unsaved entry's pending file and release its lock off the runtime.
async fn discard(entry: CacheEntry) {
    let pending = entry.paths().pending.clone();
    let result = tokio::task::spawn_blocking(move || entry.finish()).await;
    let error = match result {
        Ok(Ok(_)) => return,
        Ok(Err(e)) => CalculationError::from(e),
        Err(e) => CalculationError::from(e),
    };
    EntryCloseFailed {
        path: &pending,
        error: &error,
    }
    .log();
}

async fn resolve(repository: &dyn Repository, root: ObjectRef) -> Result<Node, CalculationError> {
    repository
        .get_object(root.kind, root.id)
        .await?
        .ok_or(CalculationError::ObjectNotFound { object: root })
}

/// Send `outcome` to the consumer. Returns false once the consumer is gone.
async fn emit(tx: &mpsc::Sender<Outcome>, progress: &mut Progress, outcome: Outcome) -> bool {
    progress.summary.record(&outcome);
    if tx.send(outcome).await.is_err() {
        tracing::debug!("outcome stream dropped, stopping run");
        return false;
    }
    true
}
