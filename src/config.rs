//! Application configuration
//!
//! Every field has a default matching the standard on-disk layout, so an empty YAML document
//! is a valid configuration.

use crate::query::{DisplayQuota, Quota, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Where the raw knowledge-graph archive is published
pub const DEFAULT_ARCHIVE_URL: &str =
    "https://github.com/xfd997700/unibiomap_demo/releases/download/dev/unibiomap.zip";

/// Node types capped at [`DEFAULT_DISPLAY_CAP`] by default
pub const DEFAULT_CAPPED_TYPES: [&str; 8] = [
    "complex",
    "compound",
    "disease",
    "genetic_disorder",
    "go",
    "pathway",
    "phenotype",
    "protein",
];

pub const DEFAULT_DISPLAY_CAP: usize = 10;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Raw tab-separated triples
    pub links_path: PathBuf,
    /// Directory holding the built-graph cache
    pub cache_dir: PathBuf,
    /// Directory the report files are written to
    pub results_dir: PathBuf,
    /// Archive downloaded when `links_path` is missing
    pub archive_url: String,
    /// Connect and per-read timeout of the archive download, in seconds
    pub fetch_timeout_secs: u64,
    /// Coarsen relation labels while building
    pub simplify_relations: bool,
    /// Depth used when a query does not name one
    pub default_depth: usize,
    /// Deepest neighborhood a query may request
    pub max_depth: usize,
    /// Per-type display caps; types not listed are unlimited
    pub display: DisplayQuota,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            links_path: PathBuf::from("database/unibiomap/unibiomap.links.tsv"),
            cache_dir: PathBuf::from("database/processed"),
            results_dir: PathBuf::from("results"),
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            simplify_relations: true,
            default_depth: 1,
            max_depth: DEFAULT_MAX_DEPTH,
            display: DisplayQuota::uniform(DEFAULT_CAPPED_TYPES, Quota::Cap(DEFAULT_DISPLAY_CAP)),
        }
    }
}

impl AppConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_depth > self.max_depth {
            return Err(ConfigError::Invalid(format!(
                "default_depth {} exceeds max_depth {}",
                self.default_depth, self.max_depth
            )));
        }
        if self.archive_url.trim().is_empty() {
            return Err(ConfigError::Invalid("archive_url is empty".to_string()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Directory the raw archive is unpacked into
    pub fn links_dir(&self) -> &Path {
        self.links_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.simplify_relations);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(60));
        assert_eq!(config.links_dir(), Path::new("database/unibiomap"));
        assert_eq!(config.display.get(&NodeType::new("go")), Quota::Cap(10));
        assert_eq!(config.display.get(&NodeType::new("unknown")), Quota::Unlimited);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "cache_dir: /tmp/cache\ndefault_depth: 2\ndisplay:\n  protein: -1\n  go: 3\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.default_depth, 2);
        assert_eq!(config.display.get(&NodeType::new("protein")), Quota::Unlimited);
        assert_eq!(config.display.get(&NodeType::new("go")), Quota::Cap(3));
        // a display section replaces the default caps entirely
        assert_eq!(config.display.get(&NodeType::new("disease")), Quota::Unlimited);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            AppConfig::from_yaml_str("default_depth: 9"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("display:\n  go: 0\n"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("fetch_timeout_secs: 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(AppConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
