//! Maps requested `group:artifact` keys to indexed coordinates.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use sysdeps_artifacts::ArtifactVerifier;
use sysdeps_core::{Coordinate, DependencyKey};
use sysdeps_repository::{PomParser, RepositoryIndex};
use tracing::debug;

/// Outcome of resolving a set of keys
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub artifacts: IndexMap<DependencyKey, Coordinate>,
    pub not_found: BTreeSet<DependencyKey>,
}

impl Resolution {
    /// Drop test-scoped and BOM coordinates, returning the removed keys.
    ///
    /// `not_found` is left as is so it still describes the full request.
    pub fn filter(&mut self) -> Vec<DependencyKey> {
        let mut removed = Vec::new();
        self.artifacts.retain(|key, coordinate| {
            let usable = !coordinate.scope.is_test() && !coordinate.is_bom();
            if !usable {
                removed.push(key.clone());
            }
            usable
        });
        removed
    }

    pub fn get(&self, key: &DependencyKey) -> Option<&Coordinate> {
        self.artifacts.get(key)
    }
}

/// Looks keys up in the repository index, optionally checking installed jars
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    index: Arc<RepositoryIndex>,
    verifier: Arc<ArtifactVerifier>,
}

impl ArtifactResolver {
    pub fn new(index: Arc<RepositoryIndex>, verifier: Arc<ArtifactVerifier>) -> Self {
        Self { index, verifier }
    }

    /// Resolver that trusts the descriptors without looking for jars
    pub fn unverified(index: Arc<RepositoryIndex>) -> Self {
        Self::new(index, Arc::new(ArtifactVerifier::AcceptAll))
    }

    pub fn index(&self) -> &Arc<RepositoryIndex> {
        &self.index
    }

    pub fn parser(&self) -> &PomParser {
        self.index.parser()
    }

    /// Resolve every key against a single index snapshot.
    ///
    /// Keys still carrying `${...}` placeholders are ignored.
    pub fn resolve<'a, I>(&self, keys: I) -> Resolution
    where
        I: IntoIterator<Item = &'a DependencyKey>,
    {
        let snapshot = self.index.snapshot();
        let mut resolution = Resolution::default();

        for key in keys {
            if key.has_placeholder() {
                debug!("Ignoring unresolved placeholder in {}", key);
                continue;
            }
            if resolution.artifacts.contains_key(key) {
                continue;
            }
            match snapshot.get(key).filter(|c| self.verifier.verify(c)) {
                Some(coordinate) => {
                    debug!("Resolved {} -> {}", key, coordinate.version);
                    resolution.artifacts.insert(key.clone(), coordinate.clone());
                },
                None => {
                    resolution.not_found.insert(key.clone());
                },
            }
        }

        resolution
    }

    /// Resolve a single key
    pub fn resolve_one(&self, key: &DependencyKey) -> Option<Coordinate> {
        if key.has_placeholder() {
            return None;
        }
        self.index
            .find_key(key)
            .filter(|coordinate| self.verifier.verify(coordinate))
    }
}
