//! # sysdeps-core
//!
//! Core types shared across all sysdeps crates.
//!
//! This crate provides:
//! - `Coordinate` and `DependencyKey`, the identity of one resolvable artifact
//! - `Scope` with its priority ordering
//! - The version comparator used to rank coordinates
//! - `SysdepsError` for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Coordinate, Scope, version ordering)
//! - `error`: Error types and result aliases
//! - `utils`: Path helpers for descriptor and jar files

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{SysdepsError, SysdepsResult};
pub use types::{
    compare_versions, ComparableVersion, Coordinate, DependencyKey, KeyError, Scope,
    BOM_PACKAGING, DEFAULT_PACKAGING,
};
