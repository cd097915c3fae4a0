//! Configuration management for artifact-cache

pub mod schema;

pub use schema::Config;

use crate::error::{CacheError, CacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("artifact-cache")
            .join("config.toml")
    }

    /// Get the default cache root
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("artifact-cache")
            .join("artifacts")
    }

    /// Cache root from config, falling back to the default
    pub fn cache_dir(config: &Config) -> PathBuf {
        config
            .cache
            .dir
            .clone()
            .unwrap_or_else(Self::default_cache_dir)
    }

    /// Read the config file
    ///
    /// A missing file is not an error: every setting has a default, so a
    /// fresh machine runs with `Config::default()`. A file that exists but
    /// does not parse is reported with its path.
    pub async fn load(&self) -> CacheResult<Config> {
        let path = &self.config_path;
        match fs::read_to_string(path).await {
            Ok(content) => toml::from_str(&content).map_err(|e| CacheError::ConfigInvalid {
                path: path.clone(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(CacheError::io(format!("reading config from {}", path.display()), e)),
        }
    }

    /// Write `config` back, creating the config directory on first use
    ///
    /// The cache directory named in the file is left alone; it is created
    /// when a cache is opened.
    pub async fn save(&self, config: &Config) -> CacheResult<()> {
        let path = &self.config_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(path, content)
            .await
            .map_err(|e| CacheError::io(format!("writing config to {}", path.display()), e))?;

        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
