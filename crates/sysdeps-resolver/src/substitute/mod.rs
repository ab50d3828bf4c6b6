//! Rewrites requested versions to the versions actually installed.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use sysdeps_core::{compare_versions, Coordinate, DependencyKey};
use tracing::info;

/// Where an applied version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    /// Pinned by an expanded BOM
    Managed,
    /// Picked from the local repository
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SubstitutionReason {
    /// Requested versions that differ from the installed one, sorted
    Override { requested: Vec<String> },
    /// Request carried no version
    Apply { source: VersionSource },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    /// `group:artifact:version` every request for the key resolves to
    pub target: String,
    pub reason: SubstitutionReason,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubstitutionPlan {
    pub substitutions: IndexMap<DependencyKey, Substitution>,
    pub overrides: Vec<String>,
    pub applies: Vec<String>,
}

impl SubstitutionPlan {
    pub fn get(&self, key: &DependencyKey) -> Option<&Substitution> {
        self.substitutions.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }

    fn record_apply(&mut self, key: &DependencyKey, version: &str, source: VersionSource) {
        let line = match source {
            VersionSource::Managed => format!("Apply BOM version: {key}:{version}"),
            VersionSource::System => format!("Apply system version: {key}:{version}"),
        };
        info!("{}", line);
        self.applies.push(line);
        self.substitutions.insert(
            key.clone(),
            Substitution {
                target: format!("{key}:{version}"),
                reason: SubstitutionReason::Apply { source },
            },
        );
    }

    fn record_override(&mut self, key: &DependencyKey, requested: Vec<String>, version: &str) {
        let line = format!(
            "Override version: {key}:{} -> {version}",
            requested.join(", ")
        );
        info!("{}", line);
        self.overrides.push(line);
        self.substitutions.insert(
            key.clone(),
            Substitution {
                target: format!("{key}:{version}"),
                reason: SubstitutionReason::Override { requested },
            },
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DependencySubstitutor;

impl DependencySubstitutor {
    pub fn new() -> Self {
        Self
    }

    /// Build the substitution plan.
    ///
    /// `requested` maps each declared key to the versions it was requested
    /// at; an empty list means the declaration had no version.
    pub fn substitute(
        &self,
        requested: &IndexMap<DependencyKey, Vec<String>>,
        resolved: &IndexMap<DependencyKey, Coordinate>,
        managed: &IndexMap<DependencyKey, String>,
    ) -> SubstitutionPlan {
        let mut plan = SubstitutionPlan::default();

        for (key, coordinate) in resolved {
            let versions = requested
                .get(key)
                .map(|versions| versions.as_slice())
                .unwrap_or_default();

            if versions.is_empty() {
                let source = if managed.contains_key(key) {
                    VersionSource::Managed
                } else {
                    VersionSource::System
                };
                plan.record_apply(key, &coordinate.version, source);
                continue;
            }

            let differing: IndexSet<&String> = versions
                .iter()
                .filter(|version| **version != coordinate.version)
                .collect();
            if differing.is_empty() {
                continue;
            }
            let mut differing: Vec<String> = differing.into_iter().cloned().collect();
            differing.sort_by(|a, b| compare_versions(Some(a.as_str()), Some(b.as_str())));
            plan.record_override(key, differing, &coordinate.version);
        }

        for (key, versions) in requested {
            if !versions.is_empty() || resolved.contains_key(key) {
                continue;
            }
            if let Some(version) = managed.get(key) {
                plan.record_apply(key, version, VersionSource::Managed);
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(group: &str, artifact: &str) -> DependencyKey {
        DependencyKey::new(group, artifact)
    }

    fn resolved(entries: &[(&str, &str, &str)]) -> IndexMap<DependencyKey, Coordinate> {
        entries
            .iter()
            .map(|(g, a, v)| (key(g, a), Coordinate::new(*g, *a, *v)))
            .collect()
    }

    #[test]
    fn test_override_single_entry() {
        let requested: IndexMap<_, _> = [(key("x", "y"), vec!["3.0".to_string()])].into();
        let plan = DependencySubstitutor::new().substitute(
            &requested,
            &resolved(&[("x", "y", "4.0")]),
            &IndexMap::new(),
        );

        assert_eq!(plan.overrides, vec!["Override version: x:y:3.0 -> 4.0"]);
        assert!(plan.applies.is_empty());
        assert_eq!(plan.get(&key("x", "y")).map(|s| s.target.as_str()), Some("x:y:4.0"));
    }

    #[test]
    fn test_override_lists_sorted_versions_once() {
        let requested: IndexMap<_, _> = [(
            key("x", "y"),
            vec![
                "3.10".to_string(),
                "4.0".to_string(),
                "3.2".to_string(),
                "3.2".to_string(),
            ],
        )]
        .into();
        let plan = DependencySubstitutor::new().substitute(
            &requested,
            &resolved(&[("x", "y", "4.0")]),
            &IndexMap::new(),
        );

        assert_eq!(plan.overrides, vec!["Override version: x:y:3.2, 3.10 -> 4.0"]);
        assert_eq!(
            plan.get(&key("x", "y")).map(|s| s.reason.clone()),
            Some(SubstitutionReason::Override {
                requested: vec!["3.2".to_string(), "3.10".to_string()]
            })
        );
    }

    #[test]
    fn test_override_drops_repeats_split_by_equal_rank() {
        let requested: IndexMap<_, _> = [(
            key("x", "y"),
            vec!["1.0".to_string(), "1.0.0".to_string(), "1.0".to_string()],
        )]
        .into();
        let plan = DependencySubstitutor::new().substitute(
            &requested,
            &resolved(&[("x", "y", "2.0")]),
            &IndexMap::new(),
        );

        assert_eq!(plan.overrides, vec!["Override version: x:y:1.0, 1.0.0 -> 2.0"]);
    }

    #[test]
    fn test_apply_without_requested_version() {
        let requested: IndexMap<_, _> = [(key("x", "z"), Vec::new())].into();
        let plan = DependencySubstitutor::new().substitute(
            &requested,
            &resolved(&[("x", "z", "1.5")]),
            &IndexMap::new(),
        );

        assert_eq!(plan.applies, vec!["Apply system version: x:z:1.5"]);
        assert!(plan.overrides.is_empty());
    }

    #[test]
    fn test_apply_managed_version() {
        let requested: IndexMap<_, _> =
            [(key("x", "z"), Vec::new()), (key("x", "absent"), Vec::new())].into();
        let managed: IndexMap<_, _> = [
            (key("x", "z"), "1.5".to_string()),
            (key("x", "absent"), "2.0".to_string()),
        ]
        .into();
        let plan = DependencySubstitutor::new().substitute(
            &requested,
            &resolved(&[("x", "z", "1.5")]),
            &managed,
        );

        assert_eq!(
            plan.applies,
            vec!["Apply BOM version: x:z:1.5", "Apply BOM version: x:absent:2.0"]
        );
    }

    #[test]
    fn test_matching_version_is_unchanged() {
        let requested: IndexMap<_, _> = [(key("g", "a"), vec!["2.0".to_string()])].into();
        let plan = DependencySubstitutor::new().substitute(
            &requested,
            &resolved(&[("g", "a", "2.0")]),
            &IndexMap::new(),
        );
        assert!(plan.is_empty());
        assert!(plan.overrides.is_empty());
        assert!(plan.applies.is_empty());
    }
}
