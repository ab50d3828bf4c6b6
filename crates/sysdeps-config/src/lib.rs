//! Configuration parsing for sysdeps
//!
//! This crate loads sysdeps.toml layers (defaults, global, project,
//! environment, command line) into one validated [`Config`], and parses the
//! request manifests that describe what a build wants resolved.

pub mod manifest;
pub mod merge;
pub mod toml;

// Re-export main types
pub use self::toml::{
    BucketConfig, CacheConfig, Config, RepositoryConfig, SysdepsToml, MAX_SCAN_DEPTH,
};
pub use manifest::{load_manifest, parse_manifest, BomEntry, DependencyEntry, RequestManifest};
pub use merge::{CliOverrides, ConfigLayering, ConfigLoader, ConfigSource, CONFIG_FILE};

use sysdeps_core::error::SysdepsError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, SysdepsError>;
