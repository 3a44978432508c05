// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::{CacheError, RepositoryError};

/// Errors that can occur while loading configuration and building the runtime
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config parsed but violates a constraint
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown extractor '{name}' (available: {})", .available.join(", "))]
    UnknownExtractor {
        name: String,
        available: Vec<&'static str>,
    },

    #[error("failed to load repository: {0}")]
    Repository(#[from] RepositoryError),

    #[error("failed to prepare result cache: {0}")]
    Cache(#[from] CacheError),
}
