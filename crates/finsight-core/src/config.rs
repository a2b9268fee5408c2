//! Finsight configuration
//!
//! Resolution order, last one wins:
//! 1. Embedded defaults (`config/finsight.toml`)
//! 2. Override file at `<local data dir>/finsight/config.toml`
//! 3. Environment: `FINSIGHT_DATASET`, `FINSIGHT_DB`, `FINSIGHT_ALLOWED_ORIGINS`
//!
//! The override file only needs the keys it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::predictor::PredictorConfig;

const DEFAULT_CONFIG: &str = include_str!("../../../config/finsight.toml");

pub const DATASET_ENV: &str = "FINSIGHT_DATASET";
pub const DB_ENV: &str = "FINSIGHT_DB";
pub const ALLOWED_ORIGINS_ENV: &str = "FINSIGHT_ALLOWED_ORIGINS";

/// Where stored profiles live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinsightConfig {
    pub predictor: PredictorConfig,
    pub dataset_path: PathBuf,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

impl Default for FinsightConfig {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            predictor: PredictorConfig::default(),
            dataset_path: data_dir.join("reference.csv"),
            storage: StorageConfig {
                backend: StorageBackend::default(),
                db_path: data_dir.join("finsight.db"),
            },
            server: ServerConfig::default(),
        }
    }
}

/// Finsight's directory under the platform's local data dir
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finsight")
}

/// Default config override path
pub fn default_config_path() -> PathBuf {
    data_dir().join("config.toml")
}

impl FinsightConfig {
    /// Defaults, then the override file, then the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;

        let override_path = default_config_path();
        if override_path.exists() {
            config.merge_file(&override_path)?;
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse a full config from TOML, starting from built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge_toml(content)?;
        Ok(config)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "Loading config override");
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        self.merge_toml(&content)
    }

    /// Apply the keys present in `content` on top of the current values
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(p) = raw.predictor {
            let forest = &mut self.predictor.forest;
            if let Some(n) = p.n_trees {
                forest.n_trees = n;
            }
            if p.max_depth.is_some() {
                forest.tree.max_depth = p.max_depth;
            }
            if let Some(n) = p.min_samples_split {
                forest.tree.min_samples_split = n;
            }
            if let Some(n) = p.min_samples_leaf {
                forest.tree.min_samples_leaf = n;
            }
            if let Some(seed) = p.seed {
                forest.seed = seed;
            }
            if let Some(bootstrap) = p.bootstrap {
                forest.bootstrap = bootstrap;
            }
            if let Some(fraction) = p.test_fraction {
                if !(0.0..1.0).contains(&fraction) {
                    return Err(Error::Config(format!(
                        "predictor.test_fraction must be in [0, 1), got {}",
                        fraction
                    )));
                }
                self.predictor.test_fraction = fraction;
            }
            if let Some(clean) = p.clean_dataset {
                self.predictor.clean_dataset = clean;
            }
        }

        if let Some(path) = raw.dataset.and_then(|d| d.path) {
            self.dataset_path = path;
        }

        if let Some(storage) = raw.storage {
            if let Some(backend) = storage.backend {
                self.storage.backend = backend.parse().map_err(Error::Config)?;
            }
            if let Some(path) = storage.path {
                self.storage.db_path = path;
            }
        }

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(origins) = server.allowed_origins {
                self.server.allowed_origins = origins;
            }
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(DATASET_ENV).filter(|v| !v.is_empty()) {
            self.dataset_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(DB_ENV).filter(|v| !v.is_empty()) {
            self.storage.db_path = PathBuf::from(path);
        }
        if let Some(origins) = lookup(ALLOWED_ORIGINS_ENV) {
            self.server.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    predictor: Option<RawPredictor>,
    dataset: Option<RawDataset>,
    storage: Option<RawStorage>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawPredictor {
    n_trees: Option<usize>,
    max_depth: Option<usize>,
    min_samples_split: Option<usize>,
    min_samples_leaf: Option<usize>,
    seed: Option<u64>,
    bootstrap: Option<bool>,
    test_fraction: Option<f64>,
    clean_dataset: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawStorage {
    backend: Option<String>,
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = FinsightConfig::embedded().unwrap();

        assert_eq!(config.predictor.forest.n_trees, 100);
        assert_eq!(config.predictor.forest.seed, 42);
        assert_eq!(config.predictor.forest.tree.max_depth, None);
        assert_eq!(config.predictor.test_fraction, 0.2);
        assert!(!config.predictor.clean_dataset);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.server.port, 3030);
        assert!(config.server.allowed_origins.is_empty());
        assert!(config.dataset_path.ends_with("reference.csv"));
    }

    #[test]
    fn test_partial_override() {
        let mut config = FinsightConfig::embedded().unwrap();
        config
            .merge_toml(
                r#"
                [predictor]
                n_trees = 10
                max_depth = 6

                [storage]
                backend = "memory"
                "#,
            )
            .unwrap();

        assert_eq!(config.predictor.forest.n_trees, 10);
        assert_eq!(config.predictor.forest.tree.max_depth, Some(6));
        // Untouched keys keep their values
        assert_eq!(config.predictor.forest.seed, 42);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = FinsightConfig::default();
        assert!(matches!(
            config.merge_toml("[storage]\nbackend = \"postgres\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config.merge_toml("[predictor]\ntest_fraction = 1.5"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config.merge_toml("not toml ["),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (DATASET_ENV, "/data/ref.csv"),
            (DB_ENV, "/data/f.db"),
            (ALLOWED_ORIGINS_ENV, "http://localhost:5173, https://app.example.com,"),
        ]);

        let mut config = FinsightConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.dataset_path, PathBuf::from("/data/ref.csv"));
        assert_eq!(config.storage.db_path, PathBuf::from("/data/f.db"));
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://localhost:5173", "https://app.example.com"]
        );
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = FinsightConfig::default();
        let before = config.dataset_path.clone();
        config.apply_env(|key| (key == DATASET_ENV).then(String::new));
        assert_eq!(config.dataset_path, before);
    }
}
