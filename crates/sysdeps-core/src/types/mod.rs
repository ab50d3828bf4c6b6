//! Core data types for local repository resolution.
//!
//! - Coordinates and dependency keys
//! - Dependency scopes
//! - Version ordering

pub mod coordinate;
pub mod scope;
pub mod version;

pub use coordinate::{Coordinate, DependencyKey, KeyError, BOM_PACKAGING, DEFAULT_PACKAGING};
pub use scope::Scope;
pub use version::{compare_versions, ComparableVersion};
