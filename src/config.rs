// Configuration loading for the todostore binary

use crate::sqlite::SqliteStorage;
use crate::storage::{FileStorage, KeyValueStorage};
use crate::store::DEFAULT_KEY;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "todostore";

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per key
    #[default]
    File,
    /// A single SQLite database
    Sqlite,
}

/// Settings read from `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where task data lives; the platform data directory when unset
    pub data_dir: Option<PathBuf>,
    pub storage_key: String,
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: DEFAULT_KEY.to_string(),
            backend: Backend::default(),
        }
    }
}

impl Config {
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir().ok_or_else(|| eyre!("Could not determine data directory")),
        }
    }

    /// Open the configured storage backend
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStorage>> {
        let data_dir = self.resolve_data_dir()?;
        debug!(data_dir = ?data_dir, backend = ?self.backend, "Opening storage");

        let storage: Box<dyn KeyValueStorage> = match self.backend {
            Backend::File => Box::new(
                FileStorage::open(&data_dir)
                    .with_context(|| format!("Failed to open storage directory: {}", data_dir.display()))?,
            ),
            Backend::Sqlite => {
                fs::create_dir_all(&data_dir)
                    .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
                let db_path = data_dir.join("todostore.db");
                Box::new(
                    SqliteStorage::open(&db_path)
                        .with_context(|| format!("Failed to open SQLite database: {}", db_path.display()))?,
                )
            }
        };

        Ok(storage)
    }
}

/// `<config dir>/todostore/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
}

/// `<data dir>/todostore`
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR))
}

/// Load configuration from `path`, or from the default location
///
/// Returns `Ok(None)` when no file exists there.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    debug!(path = ?config_path, "Loaded config");
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage_key, "todos");
        assert_eq!(config.backend, Backend::File);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.to_string_lossy().contains("todostore"));
            assert!(path.to_string_lossy().ends_with("config.yaml"));
        }
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let loaded = load_config(Some(&temp.path().join("config.yaml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: sqlite\ndata_dir: /tmp/todos\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/todos")));
        assert_eq!(config.storage_key, "todos");
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: [not, a, backend]\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_open_storage_backends() {
        let temp = TempDir::new().unwrap();

        for backend in [Backend::File, Backend::Sqlite] {
            let config = Config {
                data_dir: Some(temp.path().join(format!("{:?}", backend))),
                backend,
                ..Config::default()
            };

            let mut storage = config.open_storage().unwrap();
            storage.set("todos", "[]").unwrap();
            assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[]"));
        }
    }
}
