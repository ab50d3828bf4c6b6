//! Request manifest: what a build declares and wants resolved
//!
//! ```toml
//! plugins = ["com.acme.gradle"]
//! project_modules = ["com.acme:app"]
//!
//! [[dependency]]
//! key = "com.acme:lib"
//! versions = ["1.0"]
//! buckets = ["implementation"]
//!
//! [[bom]]
//! key = "com.acme:platform"
//! test = false
//! ```

use crate::ConfigResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use sysdeps_core::{DependencyKey, SysdepsError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestManifest {
    /// Plugin ids to map to implementation modules
    pub plugins: Vec<String>,
    /// Modules built by the project itself, never placed in buckets
    pub project_modules: Vec<DependencyKey>,
    #[serde(rename = "dependency")]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(rename = "bom")]
    pub boms: Vec<BomEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyEntry {
    pub key: DependencyKey,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub buckets: Vec<String>,
    /// Name of the build configuration this entry was declared in
    #[serde(default)]
    pub configuration: Option<String>,
    #[serde(default)]
    pub test: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BomEntry {
    pub key: DependencyKey,
    #[serde(default)]
    pub configuration: Option<String>,
    #[serde(default)]
    pub test: bool,
}

impl RequestManifest {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.boms.is_empty() && self.plugins.is_empty()
    }
}

/// Parse a manifest; `path` is only used in error messages
pub fn parse_manifest(content: &str, path: &Path) -> ConfigResult<RequestManifest> {
    let manifest: RequestManifest = toml::from_str(content).map_err(|e| SysdepsError::ManifestInvalid {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })?;
    validate_manifest(&manifest, path)?;
    Ok(manifest)
}

pub async fn load_manifest(path: &Path) -> ConfigResult<RequestManifest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SysdepsError::io(format!("Failed to read {}", path.display()), e))?;
    parse_manifest(&content, path)
}

fn validate_manifest(manifest: &RequestManifest, path: &Path) -> ConfigResult<()> {
    let invalid = |reason: String| SysdepsError::ManifestInvalid {
        path: path.to_path_buf(),
        reason,
    };

    let mut boms = HashSet::new();
    for bom in &manifest.boms {
        if !boms.insert(&bom.key) {
            return Err(invalid(format!("BOM {} is listed twice", bom.key)));
        }
    }
    for dependency in &manifest.dependencies {
        if dependency.versions.iter().any(|v| v.trim().is_empty()) {
            return Err(invalid(format!("{} has an empty version", dependency.key)));
        }
        if dependency.buckets.iter().any(|b| b.trim().is_empty()) {
            return Err(invalid(format!("{} has an empty bucket name", dependency.key)));
        }
    }
    if let Some(id) = manifest.plugins.iter().find(|id| id.trim().is_empty()) {
        return Err(invalid(format!("plugin id '{}' is empty", id)));
    }
    Ok(())
}
