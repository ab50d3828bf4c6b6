//! Checks that a resolved coordinate has an installed jar.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use sysdeps_core::utils::file_name_str;
use sysdeps_core::Coordinate;
use tracing::debug;
use walkdir::WalkDir;

/// Decides whether a coordinate is usable as a binary artifact
#[derive(Debug, Default)]
pub enum ArtifactVerifier {
    /// Trust the descriptors; every coordinate passes
    #[default]
    AcceptAll,
    /// Require a jar under the configured roots
    FileSystem(JarLocator),
}

impl ArtifactVerifier {
    pub fn file_system(roots: Vec<PathBuf>, scan_depth: usize) -> Self {
        ArtifactVerifier::FileSystem(JarLocator::new(roots, scan_depth))
    }

    /// BOMs have no binary and always pass
    pub fn verify(&self, coordinate: &Coordinate) -> bool {
        if coordinate.is_bom() {
            return true;
        }
        match self {
            ArtifactVerifier::AcceptAll => true,
            ArtifactVerifier::FileSystem(locator) => locator.locate(coordinate).is_some(),
        }
    }
}

/// Finds `<artifactId>.jar` or `<artifactId>-<version>.jar` below a set of roots
#[derive(Debug)]
pub struct JarLocator {
    roots: Vec<PathBuf>,
    scan_depth: usize,
    found: DashMap<String, Option<PathBuf>>,
}

impl JarLocator {
    pub fn new(roots: Vec<PathBuf>, scan_depth: usize) -> Self {
        Self {
            roots,
            scan_depth,
            found: DashMap::new(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Path of the installed jar, if any. Lookups are memoized per coordinate.
    pub fn locate(&self, coordinate: &Coordinate) -> Option<PathBuf> {
        let memo_key = format!("{}:{}", coordinate.artifact_id, coordinate.version);
        if let Some(hit) = self.found.get(&memo_key) {
            return hit.value().clone();
        }

        let names = jar_names(coordinate);
        let located = self
            .roots
            .iter()
            .find_map(|root| find_direct(root, &names))
            .or_else(|| {
                self.roots
                    .iter()
                    .find_map(|root| find_nested(root, &names, self.scan_depth))
            });

        match &located {
            Some(path) => debug!("Jar for {} at {}", coordinate, path.display()),
            None => debug!("No jar installed for {}", coordinate),
        }
        self.found.insert(memo_key, located.clone());
        located
    }
}

fn jar_names(coordinate: &Coordinate) -> [String; 2] {
    [
        format!("{}.jar", coordinate.artifact_id),
        format!("{}-{}.jar", coordinate.artifact_id, coordinate.version),
    ]
}

fn find_direct(root: &Path, names: &[String]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

fn find_nested(root: &Path, names: &[String], depth: usize) -> Option<PathBuf> {
    if !root.is_dir() {
        return None;
    }
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            file_name_str(entry.path()).is_some_and(|name| names.iter().any(|n| n == name))
        })
        .map(walkdir::DirEntry::into_path)
}
