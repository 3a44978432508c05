// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::CalculationError;
use crate::model::{PlaneIndex, ResultRecord};
use crate::traits::{FeatureExtractor, Repository};

/// An extractor that returns a fixed record without touching the repository
/// and counts how often it was invoked
pub struct StubExtractor {
    record: ResultRecord,
    calls: AtomicUsize,
}

impl StubExtractor {
    pub fn new(record: ResultRecord) -> Self {
        Self {
            record,
            calls: AtomicUsize::new(0),
        }
    }

    /// `{names: ["mean"], values: [mean], version: "0"}`
    pub fn mean(mean: f64) -> Self {
        Self::new(ResultRecord::new(vec!["mean".to_string()], vec![mean], "0").unwrap())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeatureExtractor for StubExtractor {
    async fn extract(
        &self,
        _repository: &dyn Repository,
        _image_id: i64,
        _plane: PlaneIndex,
    ) -> Result<ResultRecord, CalculationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.record.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// An extractor that always fails for testing failure scenarios
pub struct FailingExtractor {
    calls: AtomicUsize,
}

impl FailingExtractor {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeatureExtractor for FailingExtractor {
    async fn extract(
        &self,
        _repository: &dyn Repository,
        _image_id: i64,
        _plane: PlaneIndex,
    ) -> Result<ResultRecord, CalculationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CalculationError::Extraction {
            extractor: self.name(),
            message: "Simulated extractor failure".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
