//! Places resolved artifacts into build configuration buckets
//!
//! An artifact goes to every bucket it was declared in. Artifacts nobody
//! declared explicitly (BOM members, transitives) fall back to the test bucket
//! when test-classified, then to the bucket implied by the key's configuration
//! type, then to the bucket implied by its scope.

use crate::ScopeManager;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use sysdeps_core::{Coordinate, DependencyKey, Scope};
use tracing::debug;

/// Kind of build configuration a bucket feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigurationType {
    Api,
    Implementation,
    Runtime,
    CompileOnly,
    Test,
    #[default]
    Unknown,
}

impl ConfigurationType {
    /// Classify a bucket by name, e.g. `testRuntimeOnly` is `Test`
    pub fn from_bucket_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("test") {
            ConfigurationType::Test
        } else if name.contains("implementation") {
            ConfigurationType::Implementation
        } else if name.contains("runtime") {
            ConfigurationType::Runtime
        } else if name.contains("compileonly") {
            ConfigurationType::CompileOnly
        } else if name.contains("api") {
            ConfigurationType::Api
        } else {
            ConfigurationType::Unknown
        }
    }

    /// Bucket this type implies, if any
    fn bucket(self, names: &BucketNames) -> Option<&str> {
        match self {
            ConfigurationType::Api => Some(&names.api),
            ConfigurationType::Implementation => Some(&names.default),
            ConfigurationType::Runtime => Some(&names.runtime),
            ConfigurationType::CompileOnly => Some(&names.compile_only),
            ConfigurationType::Test => Some(&names.test),
            ConfigurationType::Unknown => None,
        }
    }
}

/// Names of the fallback buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketNames {
    pub default: String,
    pub test: String,
    pub runtime: String,
    pub compile_only: String,
    pub api: String,
}

impl Default for BucketNames {
    fn default() -> Self {
        Self {
            default: "implementation".to_string(),
            test: "testImplementation".to_string(),
            runtime: "runtimeOnly".to_string(),
            compile_only: "compileOnly".to_string(),
            api: "api".to_string(),
        }
    }
}

impl BucketNames {
    fn for_scope(&self, scope: Scope) -> &str {
        match scope {
            Scope::Compile => &self.default,
            Scope::Runtime => &self.runtime,
            Scope::Provided => &self.compile_only,
            Scope::Test => &self.test,
        }
    }
}

/// Why an artifact landed in its buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementReason {
    Declared,
    TestClassified,
    ConfigurationType,
    Scope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub key: DependencyKey,
    pub gav: String,
    pub buckets: Vec<String>,
    pub reason: PlacementReason,
}

/// Everything the configurator needs to know about the resolved set
#[derive(Debug, Clone, Default)]
pub struct ConfigurationInput {
    pub artifacts: IndexMap<DependencyKey, Coordinate>,
    /// Buckets each key was explicitly declared in
    pub buckets: IndexMap<DependencyKey, IndexSet<String>>,
    pub configuration_types: IndexMap<DependencyKey, ConfigurationType>,
    /// Keys classified as test-only
    pub test_keys: BTreeSet<DependencyKey>,
    pub scopes: ScopeManager,
    /// Modules of the project being configured
    pub project_modules: BTreeSet<DependencyKey>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigurationResult {
    pub placements: Vec<Placement>,
    /// `bucket -> {"group:artifact:version"}`
    pub buckets: BTreeMap<String, BTreeSet<String>>,
    pub skipped_boms: Vec<DependencyKey>,
    pub skipped_self: Vec<DependencyKey>,
}

impl ConfigurationResult {
    pub fn bucket(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.buckets.get(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactConfigurator {
    names: BucketNames,
}

impl ArtifactConfigurator {
    pub fn new(names: BucketNames) -> Self {
        Self { names }
    }

    pub fn bucket_names(&self) -> &BucketNames {
        &self.names
    }

    pub fn configure(&self, input: &ConfigurationInput) -> ConfigurationResult {
        let mut result = ConfigurationResult::default();

        for (key, coordinate) in &input.artifacts {
            if coordinate.is_bom() {
                result.skipped_boms.push(key.clone());
                continue;
            }
            if input.project_modules.contains(key) {
                debug!("Skipping self dependency {}", key);
                result.skipped_self.push(key.clone());
                continue;
            }

            let (buckets, reason) = self.place(key, input);
            let gav = coordinate.gav();
            for bucket in &buckets {
                result
                    .buckets
                    .entry(bucket.clone())
                    .or_default()
                    .insert(gav.clone());
            }
            debug!("{} -> {}", gav, buckets.join(", "));
            result.placements.push(Placement {
                key: key.clone(),
                gav,
                buckets,
                reason,
            });
        }

        result
    }

    fn place(&self, key: &DependencyKey, input: &ConfigurationInput) -> (Vec<String>, PlacementReason) {
        if let Some(declared) = input.buckets.get(key).filter(|b| !b.is_empty()) {
            return (declared.iter().cloned().collect(), PlacementReason::Declared);
        }

        if input.test_keys.contains(key) {
            return (vec![self.names.test.clone()], PlacementReason::TestClassified);
        }

        let typed = input
            .configuration_types
            .get(key)
            .copied()
            .filter(|kind| *kind != ConfigurationType::Test)
            .and_then(|kind| kind.bucket(&self.names));
        if let Some(bucket) = typed {
            return (vec![bucket.to_string()], PlacementReason::ConfigurationType);
        }

        let scope = input.scopes.scope(key);
        (
            vec![self.names.for_scope(scope).to_string()],
            PlacementReason::Scope,
        )
    }
}
