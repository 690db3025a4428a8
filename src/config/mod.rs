//! Configuration management for tfs

pub mod schema;

pub use schema::{CacheConfig, Config, InstallConfig};

use crate::error::{TfsError, TfsResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Loads and saves the configuration file
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
            .join("tfs")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub async fn load(&self) -> TfsResult<Config> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            debug!(path = %self.config_path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load and validate configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> TfsResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| TfsError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| TfsError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let problems = config.problems();
        if !problems.is_empty() {
            return Err(TfsError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: problems.join("; "),
            });
        }

        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> TfsResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            TfsError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!(path = %self.config_path.display(), "Configuration saved");
        Ok(())
    }

    async fn ensure_config_dir(&self) -> TfsResult<()> {
        if let Some(parent) = self.config_path.parent() {
            if parent.as_os_str().is_empty() {
                return Ok(());
            }
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TfsError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(path.clone());

        let mut config = Config::default();
        config.cache.history = 3;
        config.install.bin_directory = temp.path().join("bin");

        manager.save(&config).await.unwrap();
        assert!(path.exists());
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn invalid_toml_is_reported_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache\nhistory = 1").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        assert!(matches!(err, TfsError::ConfigInvalid { path: ref p, .. } if *p == path));
    }

    #[tokio::test]
    async fn unusable_values_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nfile_name_prefix = \"\"\n").unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(err.to_string().contains("file_name_prefix"));
    }
}
