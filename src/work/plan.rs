// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::errors::{CalculationError, ParseError};
use crate::model::{ObjectRef, WorkItem};

/// Selects slice `index` of `count` contiguous batches.
///
/// Batch sizes differ by at most one item, and concatenating batches
/// `0..count` reproduces the full plan in order.
///
/// ```
/// use plane_features::work::BatchSpec;
///
/// let spec = BatchSpec::new(1, 3).unwrap();
/// assert_eq!(spec.range(10), 3..6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBatchSpec")]
pub struct BatchSpec {
    index: usize,
    count: usize,
}

#[derive(Deserialize)]
struct RawBatchSpec {
    index: usize,
    count: usize,
}

impl TryFrom<RawBatchSpec> for BatchSpec {
    type Error = ParseError;

    fn try_from(raw: RawBatchSpec) -> Result<Self, Self::Error> {
        BatchSpec::new(raw.index, raw.count)
    }
}

impl BatchSpec {
    pub fn new(index: usize, count: usize) -> Result<Self, ParseError> {
        if count == 0 {
            return Err(ParseError::EmptyBatchCount);
        }
        if index >= count {
            return Err(ParseError::BatchIndexOutOfRange { index, count });
        }
        Ok(Self { index, count })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Item range of this batch within a plan of `total` items.
    pub fn range(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.index * total / self.count;
        let end = (self.index + 1) * total / self.count;
        start..end
    }
}

impl std::str::FromStr for BatchSpec {
    type Err = ParseError;

    /// Parses `index/count`, e.g. `2/8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, count) = s
            .split_once('/')
            .ok_or_else(|| ParseError::MalformedBatch(s.to_string()))?;
        let index = parse_batch_number("index", index)?;
        let count = parse_batch_number("count", count)?;
        BatchSpec::new(index, count)
    }
}

fn parse_batch_number(field: &'static str, value: &str) -> Result<usize, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|source| ParseError::InvalidBatchNumber {
            field,
            value: value.to_string(),
            source,
        })
}

/// The complete, ordered work list for a set of roots.
#[derive(Debug, Default)]
pub struct WorkPlan {
    items: Vec<WorkItem>,
    unresolved: Vec<(ObjectRef, CalculationError)>,
}

impl WorkPlan {
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            unresolved: Vec::new(),
        }
    }

    pub(crate) fn push_item(&mut self, item: WorkItem) {
        self.items.push(item);
    }

    pub(crate) fn push_unresolved(&mut self, root: ObjectRef, error: CalculationError) {
        self.unresolved.push((root, error));
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<WorkItem> {
        self.items
    }

    /// Roots (or containers below them) that could not be resolved or listed.
    pub fn unresolved(&self) -> &[(ObjectRef, CalculationError)] {
        &self.unresolved
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn batch(&self, spec: BatchSpec) -> &[WorkItem] {
        &self.items[spec.range(self.items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageDimensions;
    use crate::work::planes::enumerate_dimensions;

    fn plan(total_planes: u32) -> WorkPlan {
        WorkPlan::new(enumerate_dimensions(
            1,
            ImageDimensions {
                size_x: 4,
                size_y: 4,
                size_c: 1,
                size_z: 1,
                size_t: total_planes,
            },
        ))
    }

    #[test]
    fn batches_cover_plan_without_overlap() {
        let plan = plan(10);
        let mut joined = Vec::new();
        for index in 0..4 {
            joined.extend_from_slice(plan.batch(BatchSpec::new(index, 4).unwrap()));
        }
        assert_eq!(joined, plan.items());
    }

    #[test]
    fn batch_sizes_differ_by_at_most_one() {
        let sizes: Vec<usize> = (0..4)
            .map(|i| BatchSpec::new(i, 4).unwrap().range(10).len())
            .collect();
        assert_eq!(sizes.iter().sum::<usize>(), 10);
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
    }

    #[test]
    fn more_batches_than_items_leaves_some_empty() {
        let plan = plan(2);
        let non_empty = (0..5)
            .filter(|&i| !plan.batch(BatchSpec::new(i, 5).unwrap()).is_empty())
            .count();
        assert_eq!(non_empty, 2);
    }

    #[test]
    fn parses_and_validates_batch_spec() {
        assert_eq!("2/8".parse::<BatchSpec>().unwrap(), BatchSpec::new(2, 8).unwrap());
        assert_eq!(
            "8/8".parse::<BatchSpec>(),
            Err(ParseError::BatchIndexOutOfRange { index: 8, count: 8 })
        );
        assert_eq!("0/0".parse::<BatchSpec>(), Err(ParseError::EmptyBatchCount));
        assert_eq!(
            "3".parse::<BatchSpec>(),
            Err(ParseError::MalformedBatch("3".into()))
        );
        match "x/2".parse::<BatchSpec>() {
            Err(ParseError::InvalidBatchNumber { field, value, .. }) => {
                assert_eq!((field, value.as_str()), ("index", "x"));
            }
            other => panic!("expected InvalidBatchNumber, got {:?}", other),
        }
    }
}
