//! Bill-of-materials expansion
//!
//! A requested BOM is resolved through the index, its catalog is read, nested
//! BOMs are queued and every other entry becomes a pinned resolution target.
//! The set of processed BOMs (`group:artifact:version`) lives only for the
//! duration of one [`BomExpander::expand`] call.

use crate::ArtifactResolver;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use sysdeps_core::{Coordinate, DependencyKey};
use sysdeps_repository::{ParseError, PomParser};
use tracing::{debug, info, warn};

/// Which section of a BOM lists its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSource {
    /// `<dependencyManagement><dependencies>`
    #[default]
    DependencyManagement,
    /// Plain `<dependencies>`, as used by plugin markers and aggregators
    Dependencies,
}

impl CatalogSource {
    fn read(self, parser: &PomParser, path: &Path) -> Result<Arc<Vec<Coordinate>>, ParseError> {
        match self {
            CatalogSource::DependencyManagement => parser.parse_dependency_management(path),
            CatalogSource::Dependencies => parser.parse_dependencies(path),
        }
    }
}

/// Everything learned from expanding a set of requested BOMs
#[derive(Debug, Clone, Default, Serialize)]
pub struct BomExpansion {
    /// Pinned version per managed key; the first BOM to pin a key wins
    pub managed_versions: IndexMap<DependencyKey, String>,
    /// Non-BOM entries of each expanded BOM
    pub bom_members: IndexMap<DependencyKey, Vec<Coordinate>>,
    /// BOMs imported by each expanded BOM
    pub nested_boms: IndexMap<DependencyKey, Vec<DependencyKey>>,
    /// Requested keys that turned out not to be BOMs
    pub direct: IndexMap<DependencyKey, Coordinate>,
    /// Expanded BOMs in processing order
    pub processed: Vec<String>,
    pub not_found: BTreeSet<DependencyKey>,
}

impl BomExpansion {
    pub fn is_bom(&self, key: &DependencyKey) -> bool {
        self.bom_members.contains_key(key)
    }

    /// Every key that should be resolved as a result of the expansion
    pub fn targets(&self) -> IndexSet<DependencyKey> {
        self.direct
            .keys()
            .cloned()
            .chain(
                self.bom_members
                    .values()
                    .flat_map(|members| members.iter().map(Coordinate::key)),
            )
            .collect()
    }

    /// Non-BOM members of `bom`, including those of BOMs it imports
    pub fn flattened_members(&self, bom: &DependencyKey) -> Vec<Coordinate> {
        let mut seen = HashSet::new();
        let mut keys = IndexSet::new();
        let mut members = Vec::new();
        let mut stack = vec![bom.clone()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for member in self.bom_members.get(&current).into_iter().flatten() {
                if keys.insert(member.key()) {
                    members.push(member.clone());
                }
            }
            if let Some(nested) = self.nested_boms.get(&current) {
                stack.extend(nested.iter().rev().cloned());
            }
        }

        members
    }

    /// `bom key -> ["group:artifact:version", ...]` for reporting
    pub fn member_listing(&self) -> IndexMap<String, Vec<String>> {
        self.bom_members
            .keys()
            .map(|bom| {
                let gavs = self
                    .flattened_members(bom)
                    .iter()
                    .map(Coordinate::gav)
                    .collect();
                (bom.to_string(), gavs)
            })
            .collect()
    }
}

/// Expands BOM coordinates found in the local index
#[derive(Debug, Clone)]
pub struct BomExpander {
    resolver: ArtifactResolver,
}

impl BomExpander {
    pub fn new(resolver: ArtifactResolver) -> Self {
        Self { resolver }
    }

    /// Expand `requested` using each BOM's dependency-management catalog
    pub fn expand(&self, requested: &[DependencyKey]) -> BomExpansion {
        self.expand_with(requested, CatalogSource::DependencyManagement)
    }

    pub fn expand_with(&self, requested: &[DependencyKey], source: CatalogSource) -> BomExpansion {
        let mut expansion = BomExpansion::default();
        let mut processed: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<Coordinate> = VecDeque::new();

        for key in requested {
            match self.resolver.resolve_one(key) {
                Some(coordinate) if coordinate.is_bom() => queue.push_back(coordinate),
                Some(coordinate) => {
                    expansion.direct.insert(key.clone(), coordinate);
                },
                None => {
                    expansion.not_found.insert(key.clone());
                },
            }
        }

        while let Some(bom) = queue.pop_front() {
            self.expand_one(bom, source, &mut processed, &mut queue, &mut expansion);
        }

        if !expansion.processed.is_empty() {
            info!(
                "Expanded {} BOMs into {} managed versions",
                expansion.processed.len(),
                expansion.managed_versions.len()
            );
        }
        expansion
    }

    fn expand_one(
        &self,
        bom: Coordinate,
        source: CatalogSource,
        processed: &mut HashSet<String>,
        queue: &mut VecDeque<Coordinate>,
        expansion: &mut BomExpansion,
    ) {
        let gav = bom.gav();
        if !processed.insert(gav.clone()) {
            debug!("BOM {} already processed", gav);
            return;
        }

        let bom_key = bom.key();
        let mut members = Vec::new();
        let mut nested = Vec::new();

        let entries = match bom.pom_path() {
            Some(path) => match source.read(self.resolver.parser(), path) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Cannot read BOM {}: {}", gav, err);
                    Arc::new(Vec::new())
                },
            },
            None => Arc::new(Vec::new()),
        };

        for entry in entries.iter() {
            let key = entry.key();
            if entry.is_bom() {
                match self.resolver.resolve_one(&key) {
                    Some(found) if found.is_bom() => {
                        nested.push(key);
                        queue.push_back(found);
                    },
                    Some(_) | None => {
                        debug!("Imported BOM {} from {} is not installed", key, gav);
                        expansion.not_found.insert(key);
                    },
                }
                continue;
            }

            expansion
                .managed_versions
                .entry(key)
                .or_insert_with(|| entry.version.clone());
            members.push(entry.clone());
        }

        debug!(
            "BOM {}: {} members, {} nested",
            gav,
            members.len(),
            nested.len()
        );
        expansion.processed.push(gav);
        expansion.bom_members.insert(bom_key.clone(), members);
        expansion.nested_boms.insert(bom_key, nested);
    }
}
