//! Lookup from `group:artifact` to the best locally installed coordinate.
//!
//! A build produces a complete [`IndexSnapshot`] off to the side and then
//! swaps it in, so readers see either the previous index or the new one.

mod collect;

pub use collect::{collect_descriptor_files, DescriptorKind, MAX_SCAN_DEPTH};

use crate::pom::PomParser;
use crate::RepositoryResult;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use sysdeps_core::{compare_versions, Coordinate, DependencyKey};
use tracing::{debug, info, warn};

const PLUGIN_MARKER_ARTIFACT_SUFFIX: &str = ".gradle.plugin";

/// Immutable point-in-time view of the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    by_key: IndexMap<DependencyKey, Coordinate>,
    by_group: HashMap<String, Vec<Coordinate>>,
    plugin_markers: IndexMap<String, Coordinate>,
    descriptor_files: usize,
    parse_failures: usize,
    javadoc_descriptors: usize,
}

impl IndexSnapshot {
    pub fn get(&self, key: &DependencyKey) -> Option<&Coordinate> {
        self.by_key.get(key)
    }

    pub fn group(&self, group_id: &str) -> &[Coordinate] {
        self.by_group.get(group_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Marker coordinate for a plugin id, if one was installed
    pub fn plugin_marker(&self, plugin_id: &str) -> Option<&Coordinate> {
        self.plugin_markers.get(plugin_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DependencyKey, &Coordinate)> {
        self.by_key.iter()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.by_group.len()
    }

    pub fn descriptor_files(&self) -> usize {
        self.descriptor_files
    }

    pub fn parse_failures(&self) -> usize {
        self.parse_failures
    }

    pub fn javadoc_descriptors(&self) -> usize {
        self.javadoc_descriptors
    }
}

/// Repository index with atomically published snapshots
#[derive(Debug)]
pub struct RepositoryIndex {
    parser: PomParser,
    current: RwLock<Arc<IndexSnapshot>>,
}

impl RepositoryIndex {
    pub fn new(parser: PomParser) -> Self {
        Self {
            parser,
            current: RwLock::new(Arc::new(IndexSnapshot::default())),
        }
    }

    pub fn parser(&self) -> &PomParser {
        &self.parser
    }

    /// Scan `roots` and replace the current snapshot
    pub fn build(&self, roots: &[PathBuf]) -> RepositoryResult<Arc<IndexSnapshot>> {
        let files = collect_descriptor_files(roots)?;
        Ok(self.build_from_files(files))
    }

    /// Index an explicit list of descriptor files
    pub fn build_from_files<I>(&self, files: I) -> Arc<IndexSnapshot>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut snapshot = IndexSnapshot::default();

        for path in files {
            snapshot.descriptor_files += 1;
            let kind = DescriptorKind::of(&path);
            if kind == DescriptorKind::Javadoc {
                snapshot.javadoc_descriptors += 1;
                continue;
            }

            let coordinate = match self.parser.parse(&path) {
                Ok(coordinate) => coordinate,
                Err(err) => {
                    warn!("Skipping descriptor: {}", err);
                    snapshot.parse_failures += 1;
                    continue;
                },
            };
            if !coordinate.is_valid() {
                debug!("Skipping invalid coordinate from {}", path.display());
                continue;
            }

            if kind == DescriptorKind::PluginMarker {
                if let Some(plugin_id) = coordinate
                    .artifact_id
                    .strip_suffix(PLUGIN_MARKER_ARTIFACT_SUFFIX)
                {
                    insert_best(
                        &mut snapshot.plugin_markers,
                        plugin_id.to_string(),
                        coordinate.clone(),
                    );
                }
            }

            snapshot
                .by_group
                .entry(coordinate.group_id.clone())
                .or_default()
                .push(coordinate.clone());
            insert_best(&mut snapshot.by_key, coordinate.key(), coordinate);
        }

        for artifacts in snapshot.by_group.values_mut() {
            artifacts.sort_by(|a, b| {
                a.artifact_id
                    .cmp(&b.artifact_id)
                    .then_with(|| compare_versions(Some(&a.version), Some(&b.version)))
            });
        }

        info!(
            "POM index built: {} artifacts, {} groups",
            snapshot.len(),
            snapshot.group_count()
        );

        let snapshot = Arc::new(snapshot);
        *self.current.write() = Arc::clone(&snapshot);
        snapshot
    }

    pub fn find(&self, group_id: &str, artifact_id: &str) -> Option<Coordinate> {
        self.find_key(&DependencyKey::new(group_id, artifact_id))
    }

    pub fn find_key(&self, key: &DependencyKey) -> Option<Coordinate> {
        self.snapshot().get(key).cloned()
    }

    /// Every installed version of every artifact in a group, sorted by
    /// artifactId then version
    pub fn find_all_for_group(&self, group_id: &str) -> Vec<Coordinate> {
        self.snapshot().group(group_id).to_vec()
    }

    pub fn find_plugin_marker(&self, plugin_id: &str) -> Option<Coordinate> {
        self.snapshot().plugin_marker(plugin_id).cloned()
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read())
    }
}

// Newer version wins; on equal rank the first one seen stays.
fn insert_best<K>(entries: &mut IndexMap<K, Coordinate>, key: K, coordinate: Coordinate)
where
    K: std::hash::Hash + Eq,
{
    match entries.get_mut(&key) {
        Some(existing) => {
            if compare_versions(Some(&coordinate.version), Some(&existing.version))
                == Ordering::Greater
            {
                debug!("{} supersedes {}", coordinate, existing);
                *existing = coordinate;
            }
        },
        None => {
            entries.insert(key, coordinate);
        },
    }
}

#[cfg(test)]
mod tests;
