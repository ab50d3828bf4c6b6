//! Offline dependency resolution for sysdeps
//!
//! This crate turns declared `group:artifact` keys into the coordinates
//! installed in a local Maven repository: it expands BOMs, walks transitive
//! dependencies, records version substitutions, sorts artifacts into build
//! configuration buckets and maps plugin ids to their implementation modules.

pub mod artifact;
pub mod bom;
pub mod configure;
pub mod graph;
pub mod pipeline;
pub mod plugin;
pub mod scope;
pub mod substitute;
pub mod transitive;

#[cfg(test)]
mod testing;

// Re-export main types
pub use artifact::{ArtifactResolver, Resolution};
pub use bom::{BomExpander, BomExpansion, CatalogSource};
pub use configure::{
    ArtifactConfigurator, BucketNames, ConfigurationInput, ConfigurationResult,
    ConfigurationType, Placement, PlacementReason,
};
pub use graph::DependencyGraph;
pub use pipeline::{
    DeclaredBom, DeclaredDependency, IndexSummary, ResolutionContext, ResolutionPipeline,
    ResolutionReport, ResolutionRequest, ResolutionStep,
};
pub use plugin::{PluginOverride, PluginResolution, PluginResolver};
pub use scope::ScopeManager;
pub use substitute::{
    DependencySubstitutor, Substitution, SubstitutionPlan, SubstitutionReason, VersionSource,
};
pub use transitive::{TransitiveClassifier, TransitiveResult};

use sysdeps_core::error::SysdepsError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, SysdepsError>;
