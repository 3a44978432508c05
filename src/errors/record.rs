// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while building a [`ResultRecord`](crate::model::ResultRecord).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// Every feature value needs exactly one name.
    #[error("feature record has {names} names but {values} values")]
    LengthMismatch { names: usize, values: usize },
}
