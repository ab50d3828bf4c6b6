//! Artifact coordinates and dependency keys.

use super::Scope;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Packaging that marks a descriptor as a bill of materials
pub const BOM_PACKAGING: &str = "pom";

/// Packaging assumed when a descriptor does not declare one
pub const DEFAULT_PACKAGING: &str = "jar";

/// Dependency key parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid dependency key '{input}': expected group:artifact")]
    InvalidFormat { input: String },

    #[error("Invalid coordinate '{input}': expected group:artifact:version")]
    MissingVersion { input: String },
}

/// `group:artifact`, the unit of lookup throughout resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencyKey {
    group: String,
    artifact: String,
}

impl DependencyKey {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Check whether either half still carries an unresolved `${...}` token
    pub fn has_placeholder(&self) -> bool {
        self.group.contains("${") || self.artifact.contains("${")
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl FromStr for DependencyKey {
    type Err = KeyError;

    /// Accepts `group:artifact` and ignores any trailing `:version` part
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        match (parts.next(), parts.next()) {
            (Some(group), Some(artifact)) if !group.is_empty() && !artifact.is_empty() => {
                Ok(Self::new(group, artifact))
            },
            _ => Err(KeyError::InvalidFormat {
                input: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DependencyKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DependencyKey> for String {
    fn from(key: DependencyKey) -> Self {
        key.to_string()
    }
}

/// One resolvable artifact as described by a descriptor file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pom_path: Option<PathBuf>,
    /// Reached only through test-context requests
    #[serde(default)]
    pub test_context: bool,
}

impl Coordinate {
    /// Create a compile-scoped jar coordinate
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: DEFAULT_PACKAGING.to_string(),
            scope: Scope::Compile,
            pom_path: None,
            test_context: false,
        }
    }

    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_pom_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pom_path = Some(path.into());
        self
    }

    /// Group, artifact and version are all non-empty
    pub fn is_valid(&self) -> bool {
        !self.group_id.is_empty() && !self.artifact_id.is_empty() && !self.version.is_empty()
    }

    pub fn is_bom(&self) -> bool {
        self.packaging == BOM_PACKAGING
    }

    pub fn key(&self) -> DependencyKey {
        DependencyKey::new(self.group_id.clone(), self.artifact_id.clone())
    }

    /// `group:artifact:version`
    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    pub fn pom_path(&self) -> Option<&Path> {
        self.pom_path.as_deref()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.gav())
    }
}

impl FromStr for Coordinate {
    type Err = KeyError;

    /// Parses `group:artifact:version`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: DependencyKey = s.parse()?;
        let version = s.trim().splitn(3, ':').nth(2).unwrap_or_default();
        if version.is_empty() {
            return Err(KeyError::MissingVersion {
                input: s.to_string(),
            });
        }
        Ok(Coordinate::new(key.group, key.artifact, version))
    }
}
