//! LMDB store configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAP_SIZE, DEFAULT_MAX_READERS, ENV_DB_PATH, ENV_MAP_SIZE, ENV_MAX_READERS};
use crate::error::{err, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the LMDB environment; created on open
    pub path: PathBuf,
    #[serde(default = "default_map_size")]
    pub map_size: usize,
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_max_readers() -> u32 {
    DEFAULT_MAX_READERS
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            path: path.into(),
            map_size: DEFAULT_MAP_SIZE,
            max_readers: DEFAULT_MAX_READERS,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: StoreConfig = serde_json::from_str(json).map_err(err)?;
        cfg.validate()
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(err)?;
        Self::from_json(&text)
    }

    /// Build from `NODEPERM_DB_PATH`, `NODEPERM_MAP_SIZE` and `NODEPERM_MAX_READERS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let path = lookup(ENV_DB_PATH).ok_or_else(|| Error::Config(format!("{} is not set", ENV_DB_PATH)))?;
        let mut cfg = StoreConfig::new(path);
        if let Some(v) = lookup(ENV_MAP_SIZE) {
            cfg.map_size = v
                .parse()
                .map_err(|_| Error::Config(format!("{}={} is not a size", ENV_MAP_SIZE, v)))?;
        }
        if let Some(v) = lookup(ENV_MAX_READERS) {
            cfg.max_readers = v
                .parse()
                .map_err(|_| Error::Config(format!("{}={} is not a count", ENV_MAX_READERS, v)))?;
        }
        cfg.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::Config("path is empty".into()));
        }
        if self.map_size == 0 {
            return Err(Error::Config("map_size must be positive".into()));
        }
        if self.max_readers == 0 {
            return Err(Error::Config("max_readers must be positive".into()));
        }
        Ok(self)
    }
}
