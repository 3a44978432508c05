// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in implementations of the repository and extractor seams.
//!
//! The calculator only depends on the [`Repository`](crate::traits::Repository)
//! and [`FeatureExtractor`](crate::traits::FeatureExtractor) traits. This
//! module provides the implementations that ship with the crate.
//!
//! # Available Backends
//!
//! ## Local Extractors
//! In-process feature computations, created by name through
//! [`LocalExtractorFactory`](local::LocalExtractorFactory):
//! - **mean_intensity**: min, max and mean intensity of a plane
//! - **intensity_statistics**: adds standard deviation and sum
//!
//! ## Memory Repository
//! A repository whose hierarchy lives in memory, built in code or loaded from
//! a YAML manifest. Pixels are synthesized per image from a constant, a
//! gradient or explicit plane data.
//!
//! ## Stub Extractors (Test-Only)
//! - **StubExtractor**: returns a fixed record and counts its invocations
//! - **FailingExtractor**: always fails, for error handling tests
//!
//! # Examples
//!
//! ```rust
//! use plane_features::backends::local::LocalExtractorFactory;
//! use plane_features::backends::memory::{InMemoryRepository, MemoryObject};
//! use plane_features::model::PlaneIndex;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryRepository::from_objects(vec![MemoryObject::image(1, 2, 2, 1, 1, 1)])?;
//! let extractor = LocalExtractorFactory::create_extractor("mean_intensity")?;
//!
//! let record = extractor.extract(&repository, 1, PlaneIndex::new(0, 0, 0)).await?;
//! assert_eq!(record.get("mean"), Some(1.5));
//! # Ok(())
//! # }
//! ```

pub mod local;
pub mod memory;
#[cfg(test)]
pub mod stub;
