// Configuration for the productstore CLI
//
// Precedence: command-line flags > PRODUCTSTORE_DATA_DIR > config file > defaults.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default number of products per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Environment variable overriding `data_dir`
pub const DATA_DIR_ENV: &str = "PRODUCTSTORE_DATA_DIR";

const APP_DIR: &str = "productstore";
const CONFIG_FILE: &str = "config.yaml";

/// Settings read from `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// Products per page when listing
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Location of the per-user config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the per-user file is used
    /// when present and defaults otherwise. The data dir env var is applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            debug!(?dir, "Using data dir from environment");
            config.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Read a YAML config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config =
            Self::from_yaml(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.data_dir.ends_with(APP_DIR));
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = Config::from_yaml("page_size: 20\n").unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.data_dir, default_data_dir());
    }

    #[test]
    fn test_from_yaml_full() {
        let config = Config::from_yaml("data_dir: /tmp/products\npage_size: 5\n").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/products"));
        assert_eq!(config.page_size, 5);
    }

    #[test]
    fn test_from_yaml_empty_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_yaml_rejects_bad_type() {
        assert!(Config::from_yaml("page_size: many\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "page_size: 50\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_from_file_missing() {
        let temp = TempDir::new().unwrap();
        let err = Config::from_file(&temp.path().join("missing.yaml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
