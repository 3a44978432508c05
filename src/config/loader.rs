// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::backends::local::LocalExtractorFactory;
use crate::cache::LockPolicy;
use crate::config::consts::{DEFAULT_CATEGORY, DEFAULT_EXTRACTOR, DEFAULT_POLL_INTERVAL_MS};
use crate::errors::ConfigError;
use crate::model::ObjectRef;
use crate::work::BatchSpec;

/// Main configuration structure for a calculation run.
///
/// Describes where the object hierarchy comes from, where results are cached,
/// which extractor computes them and which roots to start from. It is
/// typically loaded from a YAML or TOML file with [`load_config`].
///
/// # Fields
/// * `extractor` - Name of the feature extractor (defaults to `mean_intensity`)
/// * `roots` - Objects to walk, written as `Kind:id` (may be empty when supplied on the command line)
/// * `repository` - Where the object hierarchy is loaded from
/// * `cache` - Result cache location, category and locking behaviour
/// * `batch` - Optional slice of the work plan this worker should handle
///
/// # Example
/// ```yaml
/// extractor: mean_intensity
/// roots: ["Dataset:2", "Image:11"]
/// repository:
///   manifest: repository.yaml
/// cache:
///   root: /data/features
///   category: SmallFeatureSet
///   lock:
///     mode: timeout
///     timeout_ms: 5000
///   orphan_max_age_secs: 3600
/// batch:
///   index: 0
///   count: 4
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_extractor")]
    pub extractor: String,
    #[serde(default)]
    pub roots: Vec<ObjectRef>,
    pub repository: RepositoryConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub batch: Option<BatchSpec>,
}

/// Source of the object hierarchy.
///
/// Relative manifest paths are resolved against the directory of the config
/// file by [`load_config`].
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    pub manifest: PathBuf,
}

/// Result cache configuration.
///
/// # Fields
/// * `root` - Directory that holds one subdirectory per category
/// * `category` - Feature-set category; results live under `<root>/<category>`
/// * `lock` - How long to wait for another worker's lock
/// * `orphan_max_age_secs` - When set, pending files older than this are swept before the run
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub root: PathBuf,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub orphan_max_age_secs: Option<u64>,
}

impl CacheConfig {
    pub fn orphan_max_age(&self) -> Option<Duration> {
        self.orphan_max_age_secs.map(Duration::from_secs)
    }
}

/// Lock acquisition mode for pending files.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    #[default]
    Blocking,
    NonBlocking,
    Timeout,
}

/// Lock configuration.
///
/// ```yaml
/// lock:
///   mode: timeout        # blocking | non_blocking | timeout
///   timeout_ms: 5000     # required for timeout
///   poll_interval_ms: 50 # optional, timeout mode only
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockConfig {
    #[serde(default)]
    pub mode: LockMode,
    pub timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

impl LockConfig {
    /// Translate the configured mode into a cache [`LockPolicy`].
    pub fn to_policy(&self) -> Result<LockPolicy, ConfigError> {
        match self.mode {
            LockMode::Blocking => Ok(LockPolicy::Blocking),
            LockMode::NonBlocking => Ok(LockPolicy::NonBlocking),
            LockMode::Timeout => {
                let timeout_ms = self.timeout_ms.ok_or_else(|| {
                    ConfigError::Invalid("lock mode 'timeout' requires timeout_ms".to_string())
                })?;
                let poll_interval_ms = self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
                if poll_interval_ms == 0 {
                    return Err(ConfigError::Invalid(
                        "lock poll_interval_ms must be greater than zero".to_string(),
                    ));
                }
                Ok(LockPolicy::Timeout {
                    timeout: Duration::from_millis(timeout_ms),
                    poll_interval: Duration::from_millis(poll_interval_ms),
                })
            }
        }
    }
}

fn default_extractor() -> String {
    DEFAULT_EXTRACTOR.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

impl Config {
    /// Check constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let category = self.cache.category.as_str();
        if category.is_empty() || category == "." || category == ".." {
            return Err(ConfigError::Invalid(format!(
                "cache category '{}' is not a usable directory name",
                category
            )));
        }
        if category.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "cache category '{}' must not contain path separators",
                category
            )));
        }

        if !LocalExtractorFactory::is_implementation_available(&self.extractor) {
            return Err(ConfigError::UnknownExtractor {
                name: self.extractor.clone(),
                available: LocalExtractorFactory::list_available_implementations(),
            });
        }

        self.cache.lock.to_policy()?;
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.repository.manifest.is_relative() {
            self.repository.manifest = base.join(&self.repository.manifest);
        }
        if self.cache.root.is_relative() {
            self.cache.root = base.join(&self.cache.root);
        }
    }
}

/// Parse config text in the given format.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let cfg = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(cfg)
}

/// Load a config from a YAML or TOML file.
///
/// Relative paths inside the file are resolved against the file's directory.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg = parse_config(&content, ConfigFormat::from_path(path))?;
    if let Some(base) = path.parent() {
        cfg.resolve_paths(base);
    }
    Ok(cfg)
}

/// Load a config file and validate it.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectKind;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
roots: ["Dataset:2", "image:11"]
repository:
  manifest: repo.yaml
cache:
  root: /tmp/features
"#;

        let cfg = parse_config(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(cfg.extractor, "mean_intensity");
        assert_eq!(cfg.cache.category, "SmallFeatureSet");
        assert_eq!(cfg.cache.lock.mode, LockMode::Blocking);
        assert_eq!(cfg.cache.orphan_max_age(), None);
        assert!(cfg.batch.is_none());
        assert_eq!(
            cfg.roots,
            vec![
                ObjectRef::new(ObjectKind::Dataset, 2),
                ObjectRef::new(ObjectKind::Image, 11)
            ]
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_toml_config() {
        let toml = r#"
extractor = "intensity_statistics"
roots = ["Project:1"]

[repository]
manifest = "repo.yaml"

[cache]
root = "/tmp/features"
category = "LargeFeatureSet"
orphan_max_age_secs = 600

[cache.lock]
mode = "non_blocking"

[batch]
index = 1
count = 3
"#;

        let cfg = parse_config(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(cfg.extractor, "intensity_statistics");
        assert_eq!(cfg.cache.category, "LargeFeatureSet");
        assert_eq!(cfg.cache.orphan_max_age(), Some(Duration::from_secs(600)));
        assert_eq!(cfg.cache.lock.to_policy().unwrap(), LockPolicy::NonBlocking);
        assert_eq!(cfg.batch, Some(BatchSpec::new(1, 3).unwrap()));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn timeout_lock_policy_mapping() {
        let lock = LockConfig {
            mode: LockMode::Timeout,
            timeout_ms: Some(2_000),
            poll_interval_ms: None,
        };
        assert_eq!(
            lock.to_policy().unwrap(),
            LockPolicy::Timeout {
                timeout: Duration::from_millis(2_000),
                poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            }
        );

        let missing = LockConfig {
            mode: LockMode::Timeout,
            ..LockConfig::default()
        };
        assert!(matches!(missing.to_policy(), Err(ConfigError::Invalid(_))));

        let zero_poll = LockConfig {
            mode: LockMode::Timeout,
            timeout_ms: Some(10),
            poll_interval_ms: Some(0),
        };
        assert!(matches!(zero_poll.to_policy(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_extractor_fails_validation() {
        let yaml = r#"
extractor: haralick
repository: { manifest: repo.yaml }
cache: { root: /tmp/features }
"#;
        let cfg = parse_config(yaml, ConfigFormat::Yaml).unwrap();
        match cfg.validate() {
            Err(ConfigError::UnknownExtractor { name, available }) => {
                assert_eq!(name, "haralick");
                assert!(available.contains(&"mean_intensity"));
            }
            other => panic!("expected UnknownExtractor, got {:?}", other),
        }
    }

    #[test]
    fn category_with_separator_fails_validation() {
        let yaml = r#"
repository: { manifest: repo.yaml }
cache: { root: /tmp/features, category: "../escape" }
"#;
        let cfg = parse_config(yaml, ConfigFormat::Yaml).unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_root_is_a_parse_error() {
        let yaml = r#"
roots: ["Galaxy:1"]
repository: { manifest: repo.yaml }
cache: { root: /tmp/features }
"#;
        assert!(matches!(
            parse_config(yaml, ConfigFormat::Yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn invalid_batch_is_a_parse_error() {
        let yaml = r#"
repository: { manifest: repo.yaml }
cache: { root: /tmp/features }
batch: { index: 3, count: 3 }
"#;
        assert!(parse_config(yaml, ConfigFormat::Yaml).is_err());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/run.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("run.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("run.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("run")), ConfigFormat::Yaml);
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(
            &path,
            "repository: { manifest: repo.yaml }\ncache: { root: cache, category: Small }\n",
        )
        .unwrap();

        let cfg = load_and_validate_config(&path).unwrap();
        assert_eq!(cfg.repository.manifest, dir.path().join("repo.yaml"));
        assert_eq!(cfg.cache.root, dir.path().join("cache"));
    }

    #[test]
    fn load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        match load_config(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
