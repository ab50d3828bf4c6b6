use crate::ConfigurationType;
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;
use sysdeps_core::DependencyKey;

/// One declared dependency, merged across every place it was declared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// Requested versions; empty when no declaration carried one
    pub versions: Vec<String>,
    pub buckets: IndexSet<String>,
    pub configuration_type: Option<ConfigurationType>,
    pub test: bool,
}

impl DeclaredDependency {
    /// Configuration type given explicitly or implied by the first bucket
    pub fn effective_type(&self) -> Option<ConfigurationType> {
        self.configuration_type.or_else(|| {
            self.buckets
                .first()
                .map(|bucket| ConfigurationType::from_bucket_name(bucket))
                .filter(|kind| *kind != ConfigurationType::Unknown)
        })
    }
}

/// A BOM the build imports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclaredBom {
    pub configuration_type: Option<ConfigurationType>,
    /// Members inherit test context from the BOM
    pub test: bool,
}

/// Input of one resolution run
#[derive(Debug, Clone, Default)]
pub struct ResolutionRequest {
    pub declared: IndexMap<DependencyKey, DeclaredDependency>,
    pub boms: IndexMap<DependencyKey, DeclaredBom>,
    pub plugins: Vec<String>,
    pub project_modules: BTreeSet<DependencyKey>,
}

impl ResolutionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `key`, merging with any earlier declaration of the same key
    pub fn declare(&mut self, key: DependencyKey, declaration: DeclaredDependency) -> &mut Self {
        let fresh = !self.declared.contains_key(&key);
        let entry = self.declared.entry(key).or_default();
        // main wins when the same key is declared both ways
        entry.test = if fresh {
            declaration.test
        } else {
            entry.test && declaration.test
        };
        for version in declaration.versions {
            if !version.is_empty() && !entry.versions.contains(&version) {
                entry.versions.push(version);
            }
        }
        entry.buckets.extend(declaration.buckets);
        if entry.configuration_type.is_none() {
            entry.configuration_type = declaration.configuration_type;
        }
        self
    }

    pub fn dependency(mut self, key: DependencyKey, version: Option<&str>) -> Self {
        self.declare(
            key,
            DeclaredDependency {
                versions: version.map(str::to_string).into_iter().collect(),
                ..DeclaredDependency::default()
            },
        );
        self
    }

    pub fn dependency_in(mut self, key: DependencyKey, version: Option<&str>, bucket: &str) -> Self {
        let mut buckets = IndexSet::new();
        buckets.insert(bucket.to_string());
        self.declare(
            key,
            DeclaredDependency {
                versions: version.map(str::to_string).into_iter().collect(),
                test: ConfigurationType::from_bucket_name(bucket) == ConfigurationType::Test,
                buckets,
                ..DeclaredDependency::default()
            },
        );
        self
    }

    pub fn bom(mut self, key: DependencyKey, test: bool) -> Self {
        self.boms.insert(
            key,
            DeclaredBom {
                test,
                ..DeclaredBom::default()
            },
        );
        self
    }

    pub fn plugin(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugins.push(plugin_id.into());
        self
    }

    pub fn project_module(mut self, key: DependencyKey) -> Self {
        self.project_modules.insert(key);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty() && self.boms.is_empty() && self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations_merge() {
        let key = DependencyKey::new("g", "a");
        let request = ResolutionRequest::new()
            .dependency_in(key.clone(), Some("1.0"), "implementation")
            .dependency_in(key.clone(), Some("2.0"), "testImplementation")
            .dependency_in(key.clone(), Some("1.0"), "api");

        let declared = &request.declared[&key];
        assert_eq!(declared.versions, vec!["1.0", "2.0"]);
        assert_eq!(declared.buckets.len(), 3);
        assert!(!declared.test);
        assert_eq!(declared.effective_type(), Some(ConfigurationType::Implementation));
    }

    #[test]
    fn test_test_only_declaration() {
        let key = DependencyKey::new("g", "junit");
        let request = ResolutionRequest::new().dependency_in(key.clone(), None, "testImplementation");
        assert!(request.declared[&key].test);
        assert!(request.declared[&key].versions.is_empty());
    }
}
