//! sysdeps benchmarking suite
//!
//! Criterion benchmarks for descriptor parsing, index construction and full
//! resolution runs over generated repositories.

pub mod common;

pub use common::*;
