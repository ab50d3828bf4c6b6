//! Uninterpreted view of a single descriptor file.

use super::ParseError;
use indexmap::IndexMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawPom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: IndexMap<String, String>,
    pub dependencies: Vec<RawDependency>,
    pub dependency_management: Vec<RawDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParentRef {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub packaging: Option<String>,
}

impl RawPom {
    /// Version declared here or inherited from the parent reference
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.as_deref()))
    }

    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.group_id.as_deref()))
    }
}

pub(crate) fn read_raw_pom(path: &Path) -> Result<RawPom, ParseError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = roxmltree::Document::parse(&contents).map_err(|source| ParseError::Xml {
        path: path.to_path_buf(),
        source,
    })?;

    let project = doc.root_element();
    if project.tag_name().name() != "project" {
        return Err(ParseError::NotADescriptor {
            path: path.to_path_buf(),
            root: project.tag_name().name().to_string(),
        });
    }

    let mut pom = RawPom {
        group_id: child_text(&project, "groupId"),
        artifact_id: child_text(&project, "artifactId"),
        version: child_text(&project, "version"),
        packaging: child_text(&project, "packaging"),
        ..RawPom::default()
    };

    if let Some(parent_node) = child_element(&project, "parent") {
        pom.parent = Some(ParentRef {
            group_id: child_text(&parent_node, "groupId"),
            artifact_id: child_text(&parent_node, "artifactId"),
            version: child_text(&parent_node, "version"),
            relative_path: child_text(&parent_node, "relativePath"),
        });
    }

    if let Some(props_node) = child_element(&project, "properties") {
        for child in props_node.children().filter(|n| n.is_element()) {
            let key = child.tag_name().name().to_string();
            let value = child.text().map(str::trim).unwrap_or_default();
            pom.properties.insert(key, value.to_string());
        }
    }

    if let Some(deps_node) = child_element(&project, "dependencies") {
        pom.dependencies = parse_dependencies(&deps_node);
    }

    if let Some(dep_mgmt) = child_element(&project, "dependencyManagement") {
        if let Some(deps_node) = child_element(&dep_mgmt, "dependencies") {
            pom.dependency_management = parse_dependencies(&deps_node);
        }
    }

    Ok(pom)
}

fn parse_dependencies(deps_node: &roxmltree::Node<'_, '_>) -> Vec<RawDependency> {
    deps_node
        .children()
        .filter(|n| n.is_element() && n.has_tag_name("dependency"))
        .map(|dep_node| RawDependency {
            group_id: child_text(&dep_node, "groupId"),
            artifact_id: child_text(&dep_node, "artifactId"),
            version: child_text(&dep_node, "version"),
            scope: child_text(&dep_node, "scope"),
            packaging: child_text(&dep_node, "type"),
        })
        .collect()
}

fn child_element<'a>(
    node: &'a roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: &roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
