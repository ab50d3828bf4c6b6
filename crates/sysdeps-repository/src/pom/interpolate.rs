//! `${property}` collection and substitution.

use super::hierarchy::Hierarchy;
use crate::cache::PropertyTable;
use regex::Regex;
use std::sync::OnceLock;

/// Upper bound on nested substitution rounds
pub const MAX_PASSES: usize = 20;

const DEFAULT_PROPERTIES: [(&str, &str); 2] = [
    ("project.build.sourceEncoding", "UTF-8"),
    ("project.reporting.outputEncoding", "UTF-8"),
];

/// Build the property table for the leaf of `hierarchy`.
///
/// Explicit `<properties>` of a child override those of its parents. Built-in
/// `project.*` names are only filled in where no explicit property exists.
pub(crate) fn collect_properties(hierarchy: &Hierarchy) -> PropertyTable {
    let mut props: PropertyTable = DEFAULT_PROPERTIES
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for level in hierarchy.levels() {
        for (name, value) in &level.pom.properties {
            props.insert(name.clone(), value.clone());
        }
    }

    let leaf = hierarchy.leaf();
    let parent = leaf.parent.as_ref();
    let builtins = [
        ("groupId", leaf.effective_group_id()),
        ("artifactId", leaf.artifact_id.as_deref()),
        ("version", leaf.effective_version()),
        ("packaging", leaf.packaging.as_deref()),
        ("parent.groupId", parent.and_then(|p| p.group_id.as_deref())),
        ("parent.artifactId", parent.and_then(|p| p.artifact_id.as_deref())),
        ("parent.version", parent.and_then(|p| p.version.as_deref())),
    ];

    for (name, value) in builtins {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        props
            .entry(format!("project.{name}"))
            .or_insert_with(|| value.to_string());
        props
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }

    props
}

/// Substitute `${name}` tokens until nothing changes or the pass limit is hit.
/// Unknown names stay as literal text.
pub fn interpolate(text: &str, props: &PropertyTable) -> String {
    let Some(re) = placeholder_regex() else {
        return text.to_string();
    };

    let mut current = text.to_string();
    for _ in 0..MAX_PASSES {
        if !current.contains("${") {
            break;
        }
        let next = re
            .replace_all(&current, |caps: &regex::Captures<'_>| {
                props
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

pub(crate) fn interpolate_opt(text: Option<&str>, props: &PropertyTable) -> Option<String> {
    text.map(|t| interpolate(t, props))
}

fn placeholder_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").ok()).as_ref()
}
