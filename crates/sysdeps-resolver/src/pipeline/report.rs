use crate::PluginOverride;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use sysdeps_core::Scope;
use sysdeps_repository::{DescriptorCacheStats, IndexSnapshot};
use tracing::info;

/// Size of the index the run resolved against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub artifacts: usize,
    pub groups: usize,
    pub descriptor_files: usize,
    pub parse_failures: usize,
    pub javadoc_descriptors: usize,
}

impl From<&IndexSnapshot> for IndexSummary {
    fn from(snapshot: &IndexSnapshot) -> Self {
        Self {
            artifacts: snapshot.len(),
            groups: snapshot.group_count(),
            descriptor_files: snapshot.descriptor_files(),
            parse_failures: snapshot.parse_failures(),
            javadoc_descriptors: snapshot.javadoc_descriptors(),
        }
    }
}

/// Final outcome of a [`ResolutionPipeline`](crate::ResolutionPipeline) run
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// `group:artifact -> version` for every usable artifact
    pub resolved: BTreeMap<String, String>,
    pub main: BTreeSet<String>,
    pub test: BTreeSet<String>,
    pub not_found: BTreeSet<String>,
    /// Transitive declarations with no installed descriptor
    pub skipped: BTreeSet<String>,
    /// Resolved keys dropped as BOMs or test-scoped
    pub filtered: Vec<String>,
    pub overrides: Vec<String>,
    pub applies: Vec<String>,
    /// `bom -> [group:artifact:version]`
    pub boms: IndexMap<String, Vec<String>>,
    pub buckets: BTreeMap<String, BTreeSet<String>>,
    pub plugin_overrides: Vec<PluginOverride>,
    pub unresolved_plugins: Vec<String>,
    pub scopes: BTreeMap<String, Scope>,
    pub cycles: Vec<String>,
    pub index: IndexSummary,
    pub cache: DescriptorCacheStats,
}

impl ResolutionReport {
    /// Whether every request was satisfied
    pub fn is_complete(&self) -> bool {
        self.not_found.is_empty() && self.unresolved_plugins.is_empty()
    }

    pub fn log_summary(&self) {
        info!(
            "Index: {} artifacts in {} groups ({} descriptors, {} unreadable)",
            self.index.artifacts,
            self.index.groups,
            self.index.descriptor_files,
            self.index.parse_failures
        );

        info!("Resolved {} artifacts:", self.resolved.len());
        for (key, version) in &self.resolved {
            info!("  {}:{}", key, version);
        }

        if !self.boms.is_empty() {
            info!("BOMs:");
            for (bom, members) in &self.boms {
                info!("  {} ({} members)", bom, members.len());
            }
        }

        if !self.overrides.is_empty() || !self.applies.is_empty() {
            info!("Substitutions:");
            for line in self.overrides.iter().chain(&self.applies) {
                info!("  {}", line);
            }
        }

        for (bucket, gavs) in &self.buckets {
            info!("Bucket {} ({}):", bucket, gavs.len());
            for gav in gavs {
                info!("  {}", gav);
            }
        }

        if !self.plugin_overrides.is_empty() {
            info!("Plugins:");
            for plugin in &self.plugin_overrides {
                info!("  {} -> {}", plugin.plugin_id, plugin.module);
            }
        }

        if !self.not_found.is_empty() {
            info!("Not found ({}):", self.not_found.len());
            for key in &self.not_found {
                info!("  {}", key);
            }
        }
        if !self.skipped.is_empty() {
            info!("Skipped transitives ({}):", self.skipped.len());
            for key in &self.skipped {
                info!("  {}", key);
            }
        }
        if !self.unresolved_plugins.is_empty() {
            info!("Unresolved plugins: {}", self.unresolved_plugins.join(", "));
        }
        for cycle in &self.cycles {
            info!("Cycle: {}", cycle);
        }

        for stats in self.cache.all() {
            info!(
                "Cache {}: {}/{} entries, {:.1}% hits",
                stats.name,
                stats.entries,
                stats.max_entries,
                stats.hit_rate() * 100.0
            );
        }
    }
}
