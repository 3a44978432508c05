// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Calculation engine: runs an extractor over every plane below a set of
//! roots and commits each result through the cache.

pub mod calculator;
pub mod outcome;

pub use calculator::Calculator;
pub use outcome::{Outcome, OutcomeStream, RunSummary, Subject};
