//! Plugin id to installed artifact mapping
//!
//! A plugin id is looked up as a plugin marker first, then under a list of
//! conventional artifactIds in the group named after the id, then by scanning
//! that group. Markers and other BOM-packaged hits are expanded into their
//! member modules.

use crate::{ArtifactResolver, BomExpander, CatalogSource};
use indexmap::IndexSet;
use serde::Serialize;
use sysdeps_core::{Coordinate, DependencyKey};
use tracing::{debug, info, warn};

/// Namespace of plugins bundled with the build tool itself
pub const DEFAULT_CORE_NAMESPACE: &str = "org.gradle.";

/// Instruction to load `plugin_id` from `module`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginOverride {
    pub plugin_id: String,
    /// `group:artifact:version`
    pub module: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginResolution {
    pub overrides: Vec<PluginOverride>,
    pub unresolved: Vec<String>,
    /// Core and malformed ids that were never looked up
    pub skipped: Vec<String>,
}

impl PluginResolution {
    pub fn for_plugin<'a>(&'a self, plugin_id: &'a str) -> impl Iterator<Item = &'a PluginOverride> {
        self.overrides.iter().filter(move |o| o.plugin_id == plugin_id)
    }
}

#[derive(Debug, Clone)]
pub struct PluginResolver {
    resolver: ArtifactResolver,
    core_namespace: String,
}

impl PluginResolver {
    pub fn new(resolver: ArtifactResolver) -> Self {
        Self::with_core_namespace(resolver, DEFAULT_CORE_NAMESPACE)
    }

    pub fn with_core_namespace(resolver: ArtifactResolver, core_namespace: impl Into<String>) -> Self {
        Self {
            resolver,
            core_namespace: core_namespace.into(),
        }
    }

    pub fn resolve<S: AsRef<str>>(&self, plugin_ids: &[S]) -> PluginResolution {
        let mut resolution = PluginResolution::default();

        for plugin_id in plugin_ids {
            let plugin_id = plugin_id.as_ref();
            if !plugin_id.contains('.') || plugin_id.starts_with(&self.core_namespace) {
                debug!("Skipping plugin {}", plugin_id);
                resolution.skipped.push(plugin_id.to_string());
                continue;
            }

            let overrides = self
                .locate(plugin_id)
                .map(|found| self.overrides_for(plugin_id, found))
                .unwrap_or_default();

            if overrides.is_empty() {
                warn!("Plugin not resolved: {}", plugin_id);
                resolution.unresolved.push(plugin_id.to_string());
                continue;
            }
            for o in &overrides {
                info!("Plugin {} -> {}", o.plugin_id, o.module);
            }
            resolution.overrides.extend(overrides);
        }

        resolution
    }

    fn locate(&self, plugin_id: &str) -> Option<Coordinate> {
        if let Some(marker) = self.resolver.index().find_plugin_marker(plugin_id) {
            return Some(marker);
        }

        for artifact in candidate_artifacts(plugin_id) {
            let key = DependencyKey::new(plugin_id, artifact);
            if let Some(found) = self.resolver.resolve_one(&key) {
                return Some(found);
            }
        }

        self.resolver
            .index()
            .find_all_for_group(plugin_id)
            .into_iter()
            .filter(|c| c.artifact_id.contains("gradle") || c.artifact_id.contains("plugin"))
            .find_map(|c| self.resolver.resolve_one(&c.key()))
    }

    fn overrides_for(&self, plugin_id: &str, found: Coordinate) -> Vec<PluginOverride> {
        if !found.is_bom() {
            return vec![plugin_override(plugin_id, &found)];
        }

        let key = found.key();
        let expander = BomExpander::new(self.resolver.clone());
        let mut members = expander
            .expand_with(std::slice::from_ref(&key), CatalogSource::Dependencies)
            .flattened_members(&key);
        if members.is_empty() {
            members = expander
                .expand_with(std::slice::from_ref(&key), CatalogSource::DependencyManagement)
                .flattened_members(&key);
        }

        members
            .iter()
            .filter_map(|member| {
                let installed = self.resolver.resolve_one(&member.key());
                if installed.is_none() {
                    debug!("Plugin {} member {} is not installed", plugin_id, member.gav());
                }
                installed
            })
            .map(|installed| plugin_override(plugin_id, &installed))
            .collect()
    }
}

fn plugin_override(plugin_id: &str, coordinate: &Coordinate) -> PluginOverride {
    PluginOverride {
        plugin_id: plugin_id.to_string(),
        module: coordinate.gav(),
        version: coordinate.version.clone(),
    }
}

fn variants(base: &str) -> [String; 6] {
    [
        format!("{base}-plugin"),
        format!("gradle-{base}"),
        format!("gradle-{base}-plugin"),
        format!("{base}-gradle-plugin"),
        format!("gradle-plugin-{base}"),
        format!("{base}-gradle"),
    ]
}

/// ArtifactIds a plugin's implementation is conventionally published under
pub fn candidate_artifacts(plugin_id: &str) -> IndexSet<String> {
    let mut candidates = IndexSet::new();
    candidates.insert(format!("{plugin_id}.gradle.plugin"));
    candidates.insert(plugin_id.to_string());

    let last = plugin_id.rsplit('.').next().unwrap_or(plugin_id);
    candidates.extend(variants(last));

    if let Some((_, rest)) = plugin_id.split_once('.') {
        let without_domain = rest.replace('.', "-");
        candidates.insert(without_domain.clone());
        candidates.extend(variants(&without_domain));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Dep, Repo};

    #[test]
    fn test_candidate_artifacts() {
        let candidates: Vec<String> = candidate_artifacts("com.acme.lint").into_iter().collect();
        assert_eq!(&candidates[..3], ["com.acme.lint.gradle.plugin", "com.acme.lint", "lint-plugin"]);
        assert!(candidates.contains(&"gradle-plugin-lint".to_string()));
        assert!(candidates.contains(&"acme-lint".to_string()));
        assert!(candidates.contains(&"acme-lint-gradle-plugin".to_string()));
    }

    #[test]
    fn test_core_and_malformed_ids_are_skipped() {
        let repo = Repo::new();
        let plugins = PluginResolver::new(repo.resolver());

        let resolution = plugins.resolve(&["org.gradle.java", "java-library"]);
        assert_eq!(resolution.skipped, vec!["org.gradle.java", "java-library"]);
        assert!(resolution.unresolved.is_empty());
    }

    #[test]
    fn test_marker_expands_to_implementation() {
        let repo = Repo::new();
        repo.write_pom(
            "com.acme.lint",
            "com.acme.lint.gradle.plugin",
            "2.1",
            "pom",
            &[Dep::new("com.acme", "lint-gradle", "2.1")],
            &[],
        );
        repo.jar("com.acme", "lint-gradle", "2.1");
        let plugins = PluginResolver::new(repo.resolver());

        let resolution = plugins.resolve(&["com.acme.lint"]);
        assert_eq!(
            resolution.overrides,
            vec![PluginOverride {
                plugin_id: "com.acme.lint".to_string(),
                module: "com.acme:lint-gradle:2.1".to_string(),
                version: "2.1".to_string(),
            }]
        );
    }

    #[test]
    fn test_artifact_variant_lookup() {
        let repo = Repo::new();
        repo.jar("io.spotless", "spotless-gradle-plugin", "6.0");
        let plugins = PluginResolver::new(repo.resolver());

        let resolution = plugins.resolve(&["io.spotless"]);
        assert_eq!(resolution.overrides.len(), 1);
        assert_eq!(resolution.overrides[0].module, "io.spotless:spotless-gradle-plugin:6.0");
    }

    #[test]
    fn test_group_scan_fallback() {
        let repo = Repo::new();
        repo.jar("org.example.tool", "unrelated", "1.0");
        repo.jar("org.example.tool", "tool-plugin-core", "1.0");
        let plugins = PluginResolver::new(repo.resolver());

        let resolution = plugins.resolve(&["org.example.tool"]);
        assert_eq!(
            resolution.for_plugin("org.example.tool").next().map(|o| o.module.as_str()),
            Some("org.example.tool:tool-plugin-core:1.0")
        );
    }

    #[test]
    fn test_bom_falls_back_to_dependency_management() {
        let repo = Repo::new();
        repo.bom(
            "com.acme.suite",
            "com.acme.suite.gradle.plugin",
            "3.0",
            &[Dep::new("com.acme", "suite-core", "3.0")],
        );
        repo.jar("com.acme", "suite-core", "3.0");
        let plugins = PluginResolver::new(repo.resolver());

        let resolution = plugins.resolve(&["com.acme.suite"]);
        assert_eq!(resolution.overrides.len(), 1);
        assert_eq!(resolution.overrides[0].module, "com.acme:suite-core:3.0");
    }

    #[test]
    fn test_unresolved_plugin() {
        let repo = Repo::new();
        let plugins = PluginResolver::with_core_namespace(repo.resolver(), "org.gradle.");

        let resolution = plugins.resolve(&["com.missing.plugin".to_string()]);
        assert_eq!(resolution.unresolved, vec!["com.missing.plugin"]);
        assert!(resolution.overrides.is_empty());
    }
}
