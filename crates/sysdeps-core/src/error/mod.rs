//! Error types and result aliases for sysdeps operations.
//!
//! Only a handful of conditions are fatal to a resolution run. Per-artifact
//! problems (unparseable descriptors, missing keys) are collected into reports
//! instead of being raised through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all sysdeps operations
#[derive(Error, Debug)]
pub enum SysdepsError {
    // Config errors
    #[error("Failed to parse {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Request manifest {path} is invalid: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Repository errors
    #[error("Repository directory {path} is unavailable: {reason}")]
    RepositoryUnavailable { path: PathBuf, reason: String },

    #[error("Failed to parse descriptor {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid coordinate '{input}'")]
    InvalidCoordinate { input: String },

    #[error("No installed descriptor for {key}")]
    NotFound { key: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for sysdeps operations
pub type SysdepsResult<T> = Result<T, SysdepsError>;

impl SysdepsError {
    /// Create an IO error from std::io::Error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a repository-unavailable error for `path`
    pub fn repository_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::RepositoryUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error only affects a single artifact
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SysdepsError::Parse { .. }
                | SysdepsError::InvalidCoordinate { .. }
                | SysdepsError::NotFound { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SysdepsError::RepositoryUnavailable { .. } => Some(
                "Check repository.poms in sysdeps.toml or set SYSDEPS_POMS_DIR to an existing directory",
            ),
            SysdepsError::ConfigValidation { .. } | SysdepsError::TomlParse { .. } => {
                Some("Fix the configuration file or remove the offending key to use the default")
            },
            SysdepsError::ManifestInvalid { .. } => {
                Some("Each [[dependency]] entry needs a key of the form group:artifact")
            },
            SysdepsError::InvalidCoordinate { .. } => {
                Some("Use group:artifact or group:artifact:version")
            },
            SysdepsError::NotFound { .. } => {
                Some("Run `sysdeps index --group <group>` to list what is installed")
            },
            _ => None,
        }
    }
}
