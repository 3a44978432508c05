// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod cache;
mod calculation;
mod config;
mod parse;
mod record;
mod repository;

pub use cache::CacheError;
pub use calculation::{CalculationError, FailureKind};
pub use config::ConfigError;
pub use parse::ParseError;
pub use record::RecordError;
pub use repository::RepositoryError;
