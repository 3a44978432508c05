// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::backends::local::LocalExtractorFactory;
use crate::backends::memory::manifest::load_manifest;
use crate::cache::ResultCache;
use crate::config::Config;
use crate::engine::Calculator;
use crate::errors::ConfigError;
use crate::model::ObjectRef;
use crate::traits::{FeatureExtractor, Repository};
use crate::work::BatchSpec;

/// Everything a worker needs to run, built from one [`Config`].
pub struct Runtime {
    pub repository: Arc<dyn Repository>,
    pub cache: ResultCache,
    pub extractor: Arc<dyn FeatureExtractor>,
    pub roots: Vec<ObjectRef>,
    pub batch: Option<BatchSpec>,
    pub orphan_max_age: Option<Duration>,
}

impl Runtime {
    /// A calculator over this runtime's repository and cache.
    pub fn calculator(&self) -> Calculator {
        Calculator::new(Arc::clone(&self.repository), self.cache.clone())
    }
}

/// Runtime builder - turns configuration into a repository, cache and extractor.
///
/// # Examples
///
/// ```
/// use plane_features::config::{parse_config, ConfigFormat, RuntimeBuilder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let manifest = dir.path().join("repo.yaml");
/// std::fs::write(&manifest, "objects:\n  - object: Image:1\n    image: { size_x: 2, size_y: 2, size_c: 1, size_z: 1, size_t: 1 }\n")?;
///
/// let yaml = format!(
///     "roots: [\"Image:1\"]\nrepository: {{ manifest: {:?} }}\ncache: {{ root: {:?} }}\n",
///     manifest,
///     dir.path().join("cache"),
/// );
/// let config = parse_config(&yaml, ConfigFormat::Yaml)?;
/// let runtime = RuntimeBuilder::from_config(&config)?;
///
/// assert_eq!(runtime.extractor.name(), "mean_intensity");
/// assert_eq!(runtime.cache.category(), "SmallFeatureSet");
/// # Ok(())
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the runtime described by `cfg`.
    ///
    /// Validates the config, loads the repository manifest, creates the cache
    /// category directory and instantiates the extractor.
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        cfg.validate()?;

        let lock_policy = cfg.cache.lock.to_policy()?;
        let repository: Arc<dyn Repository> = Arc::new(load_manifest(&cfg.repository.manifest)?);
        let cache =
            ResultCache::open(&cfg.cache.root, &cfg.cache.category)?.with_lock_policy(lock_policy);
        let extractor = LocalExtractorFactory::create_extractor(&cfg.extractor)?;

        Ok(Runtime {
            repository,
            cache,
            extractor,
            roots: cfg.roots.clone(),
            batch: cfg.batch,
            orphan_max_age: cfg.cache.orphan_max_age(),
        })
    }
}
