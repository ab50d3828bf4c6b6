//! Breadth-first discovery of transitive dependencies
//!
//! Starting from the resolved roots, every descriptor's `<dependencies>` are
//! read, resolved through the index and queued until no new keys appear. The
//! edges are kept in a [`DependencyGraph`] so each discovered key can be
//! classified as main (reachable from a main root) or test.

use crate::{ArtifactResolver, DependencyGraph, ScopeManager};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};
use sysdeps_core::{Coordinate, DependencyKey};
use tracing::{debug, info, warn};

/// Output of [`TransitiveClassifier::classify`]
#[derive(Debug, Clone, Default)]
pub struct TransitiveResult {
    /// Roots plus every discovered non-BOM coordinate
    pub artifacts: IndexMap<DependencyKey, Coordinate>,
    pub main: BTreeSet<DependencyKey>,
    pub test: BTreeSet<DependencyKey>,
    /// Declared keys the index could not resolve
    pub skipped: BTreeSet<DependencyKey>,
    /// BOM-packaged descriptors that were walked but not kept
    pub walked_boms: BTreeSet<DependencyKey>,
    pub scopes: ScopeManager,
    /// Dependency cycles, formatted as `a -> b -> a`
    pub cycles: Vec<String>,
}

impl TransitiveResult {
    pub fn is_test(&self, key: &DependencyKey) -> bool {
        self.test.contains(key)
    }

    /// Keys found by the walk that were not among the roots
    pub fn discovered<'a>(
        &'a self,
        roots: &'a IndexMap<DependencyKey, Coordinate>,
    ) -> impl Iterator<Item = &'a DependencyKey> + 'a {
        self.artifacts.keys().filter(move |key| !roots.contains_key(*key))
    }
}

#[derive(Debug, Clone)]
pub struct TransitiveClassifier {
    resolver: ArtifactResolver,
}

impl TransitiveClassifier {
    pub fn new(resolver: ArtifactResolver) -> Self {
        Self { resolver }
    }

    /// Walk from `roots` to a fixed point and classify every key.
    ///
    /// Roots listed in `test_roots` start in test context; all others are main.
    pub fn classify(
        &self,
        roots: &IndexMap<DependencyKey, Coordinate>,
        test_roots: &HashSet<DependencyKey>,
    ) -> TransitiveResult {
        let mut result = TransitiveResult {
            artifacts: roots.clone(),
            ..TransitiveResult::default()
        };
        let mut graph = DependencyGraph::new();
        let mut walked: HashSet<DependencyKey> = HashSet::new();
        let mut frontier: Vec<Coordinate> = roots.values().cloned().collect();

        for key in roots.keys() {
            graph.add_artifact(key);
        }

        let mut depth = 0usize;
        while !frontier.is_empty() {
            depth += 1;
            let mut next = Vec::new();

            for coordinate in frontier {
                let from = coordinate.key();
                if !walked.insert(from.clone()) {
                    continue;
                }
                self.walk_one(&coordinate, &from, &mut graph, &mut result, &mut next);
            }

            debug!("Transitive depth {}: {} new descriptors", depth, next.len());
            frontier = next;
        }

        let main_roots: Vec<&DependencyKey> =
            roots.keys().filter(|key| !test_roots.contains(*key)).collect();
        let reachable = graph.reachable_from(main_roots);

        for (key, coordinate) in result.artifacts.iter_mut() {
            if !roots.contains_key(key) {
                coordinate.scope = result.scopes.scope(key);
            }
            let is_main = reachable.contains(key);
            coordinate.test_context = !is_main;
            if is_main {
                result.main.insert(key.clone());
            } else {
                result.test.insert(key.clone());
            }
        }

        result.cycles = graph
            .cycles()
            .iter()
            .map(|cycle| DependencyGraph::format_cycle(cycle))
            .collect();
        for cycle in &result.cycles {
            debug!("Dependency cycle: {}", cycle);
        }

        info!(
            "Transitive walk: {} artifacts ({} main, {} test), {} skipped",
            result.artifacts.len(),
            result.main.len(),
            result.test.len(),
            result.skipped.len()
        );
        result
    }

    fn walk_one(
        &self,
        coordinate: &Coordinate,
        from: &DependencyKey,
        graph: &mut DependencyGraph,
        result: &mut TransitiveResult,
        next: &mut Vec<Coordinate>,
    ) {
        let Some(path) = coordinate.pom_path() else {
            return;
        };
        let declared = match self.resolver.parser().parse_dependencies(path) {
            Ok(declared) => declared,
            Err(err) => {
                warn!("Skipping dependencies of {}: {}", coordinate.gav(), err);
                return;
            },
        };

        for dependency in declared.iter() {
            let key = dependency.key();
            result.scopes.update(&key, dependency.scope);
            if dependency.scope.is_test() {
                continue;
            }
            graph.add_dependency(from, &key, dependency.scope);

            if result.artifacts.contains_key(&key)
                || result.walked_boms.contains(&key)
                || result.skipped.contains(&key)
            {
                continue;
            }

            match self.resolver.resolve_one(&key) {
                Some(found) if found.is_bom() => {
                    result.walked_boms.insert(key);
                    next.push(found);
                },
                Some(found) => {
                    result.artifacts.insert(key, found.clone());
                    next.push(found);
                },
                None => {
                    debug!("{} declares {} which is not installed", from, key);
                    result.skipped.insert(key);
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Dep, Repo};
    use sysdeps_core::Scope;

    fn key(artifact: &str) -> DependencyKey {
        DependencyKey::new("g", artifact)
    }

    fn roots(resolver: &ArtifactResolver, names: &[&str]) -> IndexMap<DependencyKey, Coordinate> {
        let keys: Vec<DependencyKey> = names.iter().map(|n| key(n)).collect();
        resolver.resolve(&keys).artifacts
    }

    #[test]
    fn test_discovers_chain() {
        let repo = Repo::new();
        repo.lib("g", "app", "1", &[Dep::new("g", "mid", "1")]);
        repo.lib("g", "mid", "1", &[Dep::new("g", "leaf", "1").scope("runtime")]);
        repo.jar("g", "leaf", "1");
        let resolver = repo.resolver();
        let classifier = TransitiveClassifier::new(resolver.clone());

        let result = classifier.classify(&roots(&resolver, &["app"]), &HashSet::new());
        let keys: Vec<&str> = result.artifacts.keys().map(|k| k.artifact()).collect();
        assert_eq!(keys, vec!["app", "mid", "leaf"]);
        assert_eq!(result.scopes.scope(&key("leaf")), Scope::Runtime);
        assert_eq!(result.artifacts[&key("leaf")].scope, Scope::Runtime);
        assert!(result.test.is_empty());
    }

    #[test]
    fn test_fixed_point() {
        let repo = Repo::new();
        repo.lib("g", "a", "1", &[Dep::new("g", "b", "1"), Dep::new("g", "c", "1")]);
        repo.lib("g", "b", "1", &[Dep::new("g", "c", "1")]);
        repo.lib("g", "c", "1", &[Dep::new("g", "a", "1")]);
        let resolver = repo.resolver();
        let classifier = TransitiveClassifier::new(resolver.clone());

        let first = classifier.classify(&roots(&resolver, &["a"]), &HashSet::new());
        let second = classifier.classify(&first.artifacts, &HashSet::new());

        let before: BTreeSet<_> = first.artifacts.keys().cloned().collect();
        let after: BTreeSet<_> = second.artifacts.keys().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(first.cycles, vec!["g:a -> g:b -> g:c -> g:a"]);
    }

    #[test]
    fn test_main_and_test_classification() {
        let repo = Repo::new();
        repo.lib("g", "app", "1", &[Dep::new("g", "shared", "1")]);
        repo.lib(
            "g",
            "junit-ext",
            "1",
            &[Dep::new("g", "shared", "1"), Dep::new("g", "hamcrest", "1")],
        );
        repo.jar("g", "shared", "1");
        repo.jar("g", "hamcrest", "1");
        let resolver = repo.resolver();
        let classifier = TransitiveClassifier::new(resolver.clone());

        let test_roots: HashSet<_> = [key("junit-ext")].into_iter().collect();
        let result = classifier.classify(&roots(&resolver, &["app", "junit-ext"]), &test_roots);

        assert!(result.main.contains(&key("app")));
        assert!(result.main.contains(&key("shared")));
        assert!(result.is_test(&key("junit-ext")));
        assert!(result.is_test(&key("hamcrest")));
        assert!(!result.artifacts[&key("shared")].test_context);
        assert!(result.artifacts[&key("hamcrest")].test_context);
    }

    #[test]
    fn test_scope_declarations_are_recorded_not_followed() {
        let repo = Repo::new();
        repo.lib("g", "app", "1", &[Dep::new("g", "mockito", "1").scope("test")]);
        repo.jar("g", "mockito", "1");
        let resolver = repo.resolver();
        let classifier = TransitiveClassifier::new(resolver.clone());

        let result = classifier.classify(&roots(&resolver, &["app"]), &HashSet::new());
        assert_eq!(result.scopes.get(&key("mockito")), Some(Scope::Test));
        assert!(!result.artifacts.contains_key(&key("mockito")));
    }

    #[test]
    fn test_unresolvable_dependencies_are_skipped() {
        let repo = Repo::new();
        repo.lib("g", "app", "1", &[Dep::new("g", "ghost", "1")]);
        let resolver = repo.resolver();
        let classifier = TransitiveClassifier::new(resolver.clone());

        let result = classifier.classify(&roots(&resolver, &["app"]), &HashSet::new());
        assert!(result.skipped.contains(&key("ghost")));
        assert_eq!(result.artifacts.len(), 1);
    }

    #[test]
    fn test_bom_dependencies_are_walked_not_kept() {
        let repo = Repo::new();
        repo.lib("g", "app", "1", &[Dep::new("g", "starter", "1").packaging("pom")]);
        repo.aggregator("g", "starter", "1", &[Dep::new("g", "engine", "1")]);
        repo.jar("g", "engine", "1");
        let resolver = repo.resolver();
        let classifier = TransitiveClassifier::new(resolver.clone());

        let result = classifier.classify(&roots(&resolver, &["app"]), &HashSet::new());
        assert!(result.walked_boms.contains(&key("starter")));
        assert!(!result.artifacts.contains_key(&key("starter")));
        assert!(result.artifacts.contains_key(&key("engine")));
        assert!(result.main.contains(&key("engine")));
    }
}
