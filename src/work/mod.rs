// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Deterministic enumeration of work items.
//!
//! A run starts from a list of repository roots. [`TreeWalker`] flattens them
//! into leaf images, [`planes::enumerate`] expands each image into one
//! [`WorkItem`](crate::model::WorkItem) per plane, and [`WorkPlan`] collects
//! the result so it can be split into batches for independent workers.
//!
//! Every step preserves order: the same repository contents always yield the
//! same work list, which is what lets uncoordinated workers agree on batch
//! boundaries.

pub mod plan;
pub mod planes;
pub mod walker;

pub use plan::{BatchSpec, WorkPlan};
pub use walker::{walk, TreeWalker};
