// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while parsing command line and config values.

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The type half of a `Kind:id` pair names no known object type.
    #[error("unknown object type '{0}'")]
    UnknownObjectKind(String),

    /// An object reference without the `:` separator.
    #[error("expected 'Type:id', got '{0}'")]
    MalformedObjectRef(String),

    #[error("invalid object id in '{input}': {source}")]
    InvalidObjectId {
        input: String,
        #[source]
        source: ParseIntError,
    },

    /// A batch selector without the `/` separator.
    #[error("expected 'index/count', got '{0}'")]
    MalformedBatch(String),

    #[error("invalid batch {field} '{value}': {source}")]
    InvalidBatchNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("batch count must be at least 1")]
    EmptyBatchCount,

    #[error("batch index {index} out of range for {count} batches")]
    BatchIndexOutOfRange { index: usize, count: usize },

    /// A required command line argument or option value is absent.
    #[error("missing {0}")]
    MissingArgument(&'static str),
}
