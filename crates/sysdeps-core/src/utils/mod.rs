//! Utility functions and helpers.
//!
//! Common functionality used across multiple sysdeps crates.

pub mod path;

pub use path::{file_name_str, has_extension, normalize_path};
