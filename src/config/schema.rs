//! Configuration schema for tfs
//!
//! Configuration is stored at `~/.config/tfs/config.toml`. Every field has
//! a default, so a partial (or missing) file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Release cache and retention
    pub cache: CacheConfig,

    /// Download and activation
    pub install: InstallConfig,
}

/// Release cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one binary per cached release
    pub directory: PathBuf,

    /// Cached binaries are named `<file_name_prefix><version>`
    pub file_name_prefix: String,

    /// Trim the cache after every switch
    pub auto_clean: bool,

    /// Releases kept by the count-based strategy
    pub history: usize,

    /// `major.minor` groups kept by the grouped strategy
    pub minor_versions: usize,

    /// Patch releases kept per group by the grouped strategy
    pub patch_versions: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tfs"),
            file_name_prefix: "terraform_".to_string(),
            auto_clean: true,
            history: 8,
            minor_versions: 0,
            patch_versions: 0,
        }
    }
}

/// Download and activation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Directory of the activation link, expected on `PATH`
    pub bin_directory: PathBuf,

    /// File name of the activation link
    pub binary_name: String,

    /// Release mirror
    pub download_url: String,

    /// Overall timeout for one download
    pub timeout_secs: u64,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            bin_directory: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("bin"),
            binary_name: "terraform".to_string(),
            download_url: "https://releases.hashicorp.com".to_string(),
            timeout_secs: 300,
        }
    }
}

impl InstallConfig {
    /// Full path of the activation link
    pub fn link_path(&self) -> PathBuf {
        self.bin_directory.join(&self.binary_name)
    }
}

impl Config {
    /// Reasons this configuration cannot be used, if any
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.cache.file_name_prefix.is_empty() {
            problems.push("cache.file_name_prefix must not be empty".to_string());
        }
        if self.install.binary_name.is_empty() {
            problems.push("install.binary_name must not be empty".to_string());
        } else if self.install.binary_name.contains(['/', '\\']) {
            problems.push("install.binary_name must be a file name, not a path".to_string());
        }
        if self.install.timeout_secs == 0 {
            problems.push("install.timeout_secs must be greater than zero".to_string());
        }
        problems
    }
}
