//! Descriptor (POM) parsing with parent inheritance and property interpolation.
//!
//! Every public operation consults the shared [`DescriptorCache`] first and
//! stores what it parsed on the way out.

mod hierarchy;
mod interpolate;
mod raw;

pub use hierarchy::MAX_DEPTH;
pub use interpolate::{interpolate, MAX_PASSES};

use crate::cache::{DescriptorCache, PropertyTable};
use hierarchy::Hierarchy;
use indexmap::IndexMap;
use interpolate::{collect_properties, interpolate_opt};
use raw::RawDependency;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sysdeps_core::{Coordinate, DependencyKey, Scope, SysdepsError, DEFAULT_PACKAGING};
use thiserror::Error;
use tracing::debug;

/// Errors produced while reading a single descriptor
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{path} is not a descriptor (root element <{root}>)")]
    NotADescriptor { path: PathBuf, root: String },
}

impl ParseError {
    pub fn path(&self) -> &Path {
        match self {
            ParseError::Io { path, .. }
            | ParseError::Xml { path, .. }
            | ParseError::NotADescriptor { path, .. } => path,
        }
    }
}

impl From<ParseError> for SysdepsError {
    fn from(err: ParseError) -> Self {
        SysdepsError::Parse {
            path: err.path().to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Reads descriptors through a shared cache
#[derive(Debug, Clone)]
pub struct PomParser {
    cache: Arc<DescriptorCache>,
}

impl PomParser {
    pub fn new(cache: Arc<DescriptorCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// Effective coordinate of the descriptor at `path`.
    ///
    /// The result may be invalid (for example a descriptor with no version
    /// anywhere in its chain); callers decide whether to keep it.
    pub fn parse(&self, path: &Path) -> Result<Coordinate, ParseError> {
        if let Some(coordinate) = self.cache.coordinate(path) {
            return Ok(coordinate);
        }

        let hierarchy = Hierarchy::load(path)?;
        let props = collect_properties(&hierarchy);
        let leaf = hierarchy.leaf();

        let field = |value: Option<&str>| interpolate_opt(value, &props).unwrap_or_default();
        let packaging = interpolate_opt(leaf.packaging.as_deref(), &props)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PACKAGING.to_string());

        let coordinate = Coordinate::new(
            field(leaf.effective_group_id()),
            field(leaf.artifact_id.as_deref()),
            field(leaf.effective_version()),
        )
        .with_packaging(packaging)
        .with_pom_path(path);

        debug!(
            "Parsed {} from {} ({} levels)",
            coordinate,
            path.display(),
            hierarchy.len()
        );
        self.cache.put_coordinate(path, coordinate.clone());
        Ok(coordinate)
    }

    /// Declared dependencies, inherited ones included, with managed
    /// versions, scopes and types filled in
    pub fn parse_dependencies(&self, path: &Path) -> Result<Arc<Vec<Coordinate>>, ParseError> {
        if let Some(dependencies) = self.cache.dependencies(path) {
            return Ok(dependencies);
        }

        let hierarchy = Hierarchy::load(path)?;
        let props = collect_properties(&hierarchy);
        let managed = managed_entries(&hierarchy, &props);

        let mut declared: IndexMap<DependencyKey, RawDependency> = IndexMap::new();
        for level in hierarchy.levels() {
            for raw in &level.pom.dependencies {
                let dep = interpolate_dependency(raw, &props);
                if let Some(key) = raw_key(&dep) {
                    declared.insert(key, dep);
                }
            }
        }

        let dependencies: Vec<Coordinate> = declared
            .into_iter()
            .map(|(key, mut dep)| {
                if let Some(entry) = managed.get(&key) {
                    apply_managed(&mut dep, entry);
                }
                to_coordinate(dep)
            })
            .filter(Coordinate::is_valid)
            .collect();

        let dependencies = Arc::new(dependencies);
        self.cache.put_dependencies(path, Arc::clone(&dependencies));
        Ok(dependencies)
    }

    /// Entries of the merged `<dependencyManagement>` catalog
    pub fn parse_dependency_management(
        &self,
        path: &Path,
    ) -> Result<Arc<Vec<Coordinate>>, ParseError> {
        if let Some(managed) = self.cache.dependency_management(path) {
            return Ok(managed);
        }

        let hierarchy = Hierarchy::load(path)?;
        let props = collect_properties(&hierarchy);
        let managed: Vec<Coordinate> = managed_entries(&hierarchy, &props)
            .into_values()
            .map(to_coordinate)
            .filter(Coordinate::is_valid)
            .collect();

        let managed = Arc::new(managed);
        self.cache
            .put_dependency_management(path, Arc::clone(&managed));
        Ok(managed)
    }

    /// Full property table, inherited and built-in entries included
    pub fn parse_properties(&self, path: &Path) -> Result<Arc<PropertyTable>, ParseError> {
        if let Some(props) = self.cache.properties(path) {
            return Ok(props);
        }

        let hierarchy = Hierarchy::load(path)?;
        let props = Arc::new(collect_properties(&hierarchy));
        self.cache.put_properties(path, Arc::clone(&props));
        Ok(props)
    }
}

impl Default for PomParser {
    fn default() -> Self {
        Self::new(Arc::new(DescriptorCache::default()))
    }
}

fn managed_entries(
    hierarchy: &Hierarchy,
    props: &PropertyTable,
) -> IndexMap<DependencyKey, RawDependency> {
    let mut managed = IndexMap::new();
    for level in hierarchy.levels() {
        for raw in &level.pom.dependency_management {
            let dep = interpolate_dependency(raw, props);
            if let Some(key) = raw_key(&dep) {
                managed.insert(key, dep);
            }
        }
    }
    managed
}

fn interpolate_dependency(raw: &RawDependency, props: &PropertyTable) -> RawDependency {
    RawDependency {
        group_id: interpolate_opt(raw.group_id.as_deref(), props),
        artifact_id: interpolate_opt(raw.artifact_id.as_deref(), props),
        version: interpolate_opt(raw.version.as_deref(), props),
        scope: interpolate_opt(raw.scope.as_deref(), props),
        packaging: interpolate_opt(raw.packaging.as_deref(), props),
    }
}

fn raw_key(dep: &RawDependency) -> Option<DependencyKey> {
    let group = dep.group_id.as_deref().filter(|g| !g.is_empty())?;
    let artifact = dep.artifact_id.as_deref().filter(|a| !a.is_empty())?;
    Some(DependencyKey::new(group, artifact))
}

fn apply_managed(dep: &mut RawDependency, managed: &RawDependency) {
    if dep.version.as_deref().map_or(true, str::is_empty) {
        dep.version = managed.version.clone();
    }
    if dep.scope.is_none() {
        dep.scope = managed.scope.clone();
    }
    if dep.packaging.as_deref().map_or(true, str::is_empty) {
        dep.packaging = managed.packaging.clone();
    }
}

fn to_coordinate(dep: RawDependency) -> Coordinate {
    let scope = Scope::parse_opt(dep.scope.as_deref());
    let packaging = dep
        .packaging
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PACKAGING.to_string());

    Coordinate::new(
        dep.group_id.unwrap_or_default(),
        dep.artifact_id.unwrap_or_default(),
        dep.version.unwrap_or_default(),
    )
    .with_packaging(packaging)
    .with_scope(scope)
}
