//! sysdeps.toml parsing and validation

use crate::ConfigResult;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use sysdeps_core::SysdepsError;

/// Deepest directory walk allowed when looking for installed jars
pub const MAX_SCAN_DEPTH: usize = 10;

/// One sysdeps.toml file. Every key is optional so files can be layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SysdepsToml {
    pub repository: RepositorySection,
    pub cache: CacheSection,
    pub buckets: BucketsSection,
    pub plugins: PluginsSection,
}

/// `[repository]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositorySection {
    /// Descriptor roots; the first one is the primary root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poms: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jars: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_artifacts: Option<bool>,
}

/// `[cache]`, maximum entries per descriptor cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_management: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

/// `[buckets]`, names of the fallback configuration buckets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_only: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
}

/// `[plugins]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_namespace: Option<String>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub cache: CacheConfig,
    pub buckets: BucketConfig,
    pub core_namespace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryConfig {
    pub poms: Vec<PathBuf>,
    pub jars: Vec<PathBuf>,
    pub scan_depth: usize,
    pub verify_artifacts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheConfig {
    pub coordinates: usize,
    pub dependency_management: usize,
    pub dependencies: usize,
    pub properties: usize,
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketConfig {
    pub default: String,
    pub test: String,
    pub runtime: String,
    pub compile_only: String,
    pub api: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig {
                poms: vec![PathBuf::from("/usr/share/maven-poms")],
                jars: vec![PathBuf::from("/usr/share/java")],
                scan_depth: 3,
                verify_artifacts: true,
            },
            cache: CacheConfig {
                coordinates: 1000,
                dependency_management: 500,
                dependencies: 2000,
                properties: 1000,
                ttl_secs: 30 * 60,
            },
            buckets: BucketConfig {
                default: "implementation".to_string(),
                test: "testImplementation".to_string(),
                runtime: "runtimeOnly".to_string(),
                compile_only: "compileOnly".to_string(),
                api: "api".to_string(),
            },
            core_namespace: "org.gradle.".to_string(),
        }
    }
}

impl Config {
    /// Overlay every key `layer` sets
    pub fn apply(&mut self, layer: &SysdepsToml) {
        let repo = &layer.repository;
        if let Some(poms) = &repo.poms {
            self.repository.poms = poms.clone();
        }
        if let Some(jars) = &repo.jars {
            self.repository.jars = jars.clone();
        }
        if let Some(depth) = repo.scan_depth {
            self.repository.scan_depth = depth;
        }
        if let Some(verify) = repo.verify_artifacts {
            self.repository.verify_artifacts = verify;
        }

        let cache = &layer.cache;
        overlay(&mut self.cache.coordinates, cache.coordinates);
        overlay(&mut self.cache.dependency_management, cache.dependency_management);
        overlay(&mut self.cache.dependencies, cache.dependencies);
        overlay(&mut self.cache.properties, cache.properties);
        overlay(&mut self.cache.ttl_secs, cache.ttl_secs);

        let buckets = &layer.buckets;
        overlay(&mut self.buckets.default, buckets.default.clone());
        overlay(&mut self.buckets.test, buckets.test.clone());
        overlay(&mut self.buckets.runtime, buckets.runtime.clone());
        overlay(&mut self.buckets.compile_only, buckets.compile_only.clone());
        overlay(&mut self.buckets.api, buckets.api.clone());

        overlay(&mut self.core_namespace, layer.plugins.core_namespace.clone());
    }
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Parse one sysdeps.toml
pub fn parse_sysdeps_toml(content: &str, path: &Utf8Path) -> ConfigResult<SysdepsToml> {
    toml::from_str(content).map_err(|e| SysdepsError::TomlParse {
        path: path.as_std_path().to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Serialize a layer back to TOML
pub fn serialize_sysdeps_toml(layer: &SysdepsToml) -> ConfigResult<String> {
    toml::to_string_pretty(layer).map_err(|e| SysdepsError::Internal {
        message: format!("TOML serialization error: {}", e),
    })
}

/// Load and parse a sysdeps.toml from disk
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<SysdepsToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SysdepsError::io(format!("Failed to read {}", path), e))?;
    parse_sysdeps_toml(&content, path)
}

/// Check the merged configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    let repo = &config.repository;
    if repo.poms.is_empty() {
        return Err(invalid("repository.poms", "at least one descriptor root is required"));
    }
    if !(1..=MAX_SCAN_DEPTH).contains(&repo.scan_depth) {
        return Err(invalid(
            "repository.scan_depth",
            format!("must be between 1 and {}, got {}", MAX_SCAN_DEPTH, repo.scan_depth),
        ));
    }

    let cache = &config.cache;
    for (field, size) in [
        ("cache.coordinates", cache.coordinates),
        ("cache.dependency_management", cache.dependency_management),
        ("cache.dependencies", cache.dependencies),
        ("cache.properties", cache.properties),
    ] {
        if size == 0 {
            return Err(invalid(field, "cache size must be positive"));
        }
    }

    let buckets = &config.buckets;
    for (field, name) in [
        ("buckets.default", &buckets.default),
        ("buckets.test", &buckets.test),
        ("buckets.runtime", &buckets.runtime),
        ("buckets.compile_only", &buckets.compile_only),
        ("buckets.api", &buckets.api),
    ] {
        if name.trim().is_empty() {
            return Err(invalid(field, "bucket name must not be empty"));
        }
    }

    Ok(())
}

fn invalid(field: &str, reason: impl Into<String>) -> SysdepsError {
    SysdepsError::ConfigValidation {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ConfigResult<SysdepsToml> {
        parse_sysdeps_toml(content, Utf8Path::new("sysdeps.toml"))
    }

    #[test]
    fn test_parse_full_config() {
        let layer = parse(
            r#"
[repository]
poms = ["/srv/poms", "/opt/poms"]
jars = ["/srv/java"]
scan_depth = 5
verify_artifacts = false

[cache]
coordinates = 10
ttl_secs = 60

[buckets]
default = "compile"

[plugins]
core_namespace = "org.example."
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply(&layer);

        assert_eq!(config.repository.poms.len(), 2);
        assert_eq!(config.repository.scan_depth, 5);
        assert!(!config.repository.verify_artifacts);
        assert_eq!(config.cache.coordinates, 10);
        assert_eq!(config.cache.dependencies, 2000);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.buckets.default, "compile");
        assert_eq!(config.buckets.test, "testImplementation");
        assert_eq!(config.core_namespace, "org.example.");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let mut config = Config::default();
        config.apply(&parse("").unwrap());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse("[repository]\npom = []\n").unwrap_err();
        assert!(matches!(err, SysdepsError::TomlParse { .. }));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.repository.scan_depth = 0;
        assert!(matches!(
            validate_config(&config),
            Err(SysdepsError::ConfigValidation { ref field, .. }) if field == "repository.scan_depth"
        ));

        let mut config = Config::default();
        config.repository.scan_depth = MAX_SCAN_DEPTH + 1;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.cache.dependencies = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.repository.poms.clear();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.buckets.api = " ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_round_trip_serialization() {
        let layer = parse("[repository]\nscan_depth = 4\n\n[buckets]\ntest = \"testCompile\"\n").unwrap();
        let serialized = serialize_sysdeps_toml(&layer).unwrap();
        assert_eq!(parse(&serialized).unwrap(), layer);
    }
}
