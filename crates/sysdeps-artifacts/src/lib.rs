//! Binary artifact lookup for sysdeps
//!
//! Descriptors say what exists; this crate checks that the matching jar is
//! actually installed and lists the directories a host build should use as
//! flat artifact repositories.

pub mod layout;
pub mod verify;

// Re-export main types
pub use layout::RepositoryLayout;
pub use verify::{ArtifactVerifier, JarLocator};

use sysdeps_core::error::SysdepsError;

/// Result type for artifact operations
pub type ArtifactResult<T> = Result<T, SysdepsError>;
