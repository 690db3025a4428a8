//! Error types for tfs
//!
//! All modules use `TfsResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tfs operations
pub type TfsResult<T> = Result<T, TfsError>;

/// All errors that can occur in tfs
#[derive(Error, Debug)]
pub enum TfsError {
    // Parse errors
    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid version constraint '{input}': {reason}")]
    InvalidConstraint { input: String, reason: String },

    #[error("Unexpected file in cache directory: {file_name}: {reason}")]
    CacheEntry { file_name: String, reason: String },

    // Resolution errors
    #[error("No cached version satisfies '{constraint}' and no minimal version can be derived from it")]
    Unsatisfiable { constraint: String },

    // Fetch errors
    #[error("Download failed: {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("No checksum published for {0}")]
    ChecksumMissing(String),

    #[error("Invalid release archive: {reason}")]
    Archive { reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl TfsError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a version parse error
    pub fn invalid_version(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a constraint parse error
    pub fn invalid_constraint(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from parsing user input
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidVersion { .. } | Self::InvalidConstraint { .. } | Self::CacheEntry { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Unsatisfiable { .. } => {
                Some("Specify an exact version (e.g. tfs 1.9.8) or install one first")
            }
            Self::CacheEntry { .. } => Some("Move or delete the file, then run the command again"),
            Self::ChecksumMismatch { .. } => Some("Retry the download; the archive may be corrupt"),
            Self::ConfigInvalid { .. } => Some("Fix the file or reset it with: tfs config init --force"),
            _ => None,
        }
    }
}
