//! Store configuration.
//!
//! Read from TOML, then overridden from the environment:
//! - `ACCOUNT_STORE_CONFIG`: config file path (default `config.toml`)
//! - `ACCOUNT_STORE_KEY`: storage key
//! - `ACCOUNT_STORE_DATA_DIR`: directory for the file backend

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::stores::{validate_key, AccountStore, FileBackend, STORAGE_KEY};
use crate::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "ACCOUNT_STORE_CONFIG";
pub const KEY_ENV: &str = "ACCOUNT_STORE_KEY";
pub const DATA_DIR_ENV: &str = "ACCOUNT_STORE_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub storage_key: String,
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_owned(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl StoreConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Loads the config file named by `ACCOUNT_STORE_CONFIG` (or
    /// `config.toml`), using defaults when it does not exist, then applies
    /// environment overrides.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_owned());
        let mut config = match fs::metadata(&path) {
            Ok(_) => Self::load_from_file(&path)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%path, "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(Error::Config(format!("failed to stat {path}: {e}"))),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps an environment variable
    /// name to its value. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(KEY_ENV).filter(|v| !v.is_empty()) {
            self.storage_key = key;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    /// Rejects storage keys the file backend could not store under.
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(Error::Config("storage_key must not be empty".to_owned()));
        }
        validate_key(&self.storage_key)
            .map_err(|e| Error::Config(format!("storage_key {:?}: {e}", self.storage_key)))
    }

    /// Validates, then opens a file-backed store under `data_dir` and
    /// performs the initial load.
    pub fn open_file_store(&self) -> Result<AccountStore<FileBackend>> {
        self.validate()?;
        Ok(AccountStore::with_key(
            FileBackend::new(&self.data_dir),
            self.storage_key.clone(),
        ))
    }
}
