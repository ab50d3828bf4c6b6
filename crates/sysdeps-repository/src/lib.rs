//! Local Maven repository access for sysdeps
//!
//! This crate reads descriptor (POM) files from disk, resolves their parent
//! chains and `${property}` references, caches the parsed results and builds
//! an index from `group:artifact` to the best locally installed coordinate.

pub mod cache;
pub mod index;
pub mod pom;

// Re-export main types
pub use cache::{CachePolicy, CacheSettings, CacheStats, DescriptorCache, DescriptorCacheStats, Expiry};
pub use index::{DescriptorKind, IndexSnapshot, RepositoryIndex};
pub use pom::{ParseError, PomParser};

use sysdeps_core::error::SysdepsError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, SysdepsError>;
