//! Configuration layering, file discovery and environment overrides

use crate::toml::{validate_config, Config, SysdepsToml};
use crate::ConfigResult;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::path::PathBuf;
use sysdeps_core::SysdepsError;
use tracing::debug;

/// Project configuration file name
pub const CONFIG_FILE: &str = "sysdeps.toml";

const ENV_POMS_DIR: &str = "SYSDEPS_POMS_DIR";
const ENV_JARS_DIR: &str = "SYSDEPS_JARS_DIR";
const ENV_SCAN_DEPTH: &str = "SYSDEPS_SCAN_DEPTH";
const ENV_VERIFY_ARTIFACTS: &str = "SYSDEPS_VERIFY_ARTIFACTS";

/// Where a configuration layer came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Defaults,
    /// `~/.sysdeps/config.toml`
    Global(Utf8PathBuf),
    /// Nearest sysdeps.toml above the working directory
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    CommandLine,
}

/// Values given as command line flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub poms: Vec<PathBuf>,
    pub jars: Vec<PathBuf>,
    pub scan_depth: Option<usize>,
    pub verify_artifacts: Option<bool>,
}

impl CliOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Finds and merges every configuration layer
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Home directory, `None` when it cannot be determined
    home: Option<Utf8PathBuf>,
}

impl ConfigLoader {
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let home = dirs::home_dir().and_then(|home| Utf8PathBuf::try_from(home).ok());
        Self { cwd, home }
    }

    /// Loader with an explicit home directory
    pub fn with_home(cwd: Utf8PathBuf, home: Option<Utf8PathBuf>) -> Self {
        Self { cwd, home }
    }

    /// Nearest `filename` in the working directory or one of its parents
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(filename))
            .find(|candidate| candidate.is_file())
    }

    pub fn global_config_path(&self) -> Option<Utf8PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(".sysdeps").join("config.toml"))
    }

    pub async fn load_global_config(&self) -> ConfigResult<Option<(SysdepsToml, Utf8PathBuf)>> {
        match self.global_config_path() {
            Some(path) if path.is_file() => {
                let layer = crate::toml::load_from_file(&path).await?;
                Ok(Some((layer, path)))
            },
            _ => Ok(None),
        }
    }

    pub async fn load_project_config(&self) -> ConfigResult<Option<(SysdepsToml, Utf8PathBuf)>> {
        match self.resolve_config_path(CONFIG_FILE) {
            Some(path) => {
                let layer = crate::toml::load_from_file(&path).await?;
                Ok(Some((layer, path)))
            },
            None => Ok(None),
        }
    }

    /// Load, merge and validate every layer
    pub async fn load(&self, cli: &CliOverrides) -> ConfigResult<(Config, Vec<ConfigSource>)> {
        let global = self.load_global_config().await?;
        let project = self.load_project_config().await?;
        let env = ConfigLayering::collect_env_overrides();

        let mut sources = vec![ConfigSource::Defaults];
        if let Some((_, path)) = &global {
            sources.push(ConfigSource::Global(path.clone()));
        }
        if let Some((_, path)) = &project {
            sources.push(ConfigSource::Project(path.clone()));
        }
        sources.extend(env.keys().cloned().map(ConfigSource::Environment));
        if !cli.is_empty() {
            sources.push(ConfigSource::CommandLine);
        }

        let config = ConfigLayering::merge_configs(
            global.map(|(layer, _)| layer),
            project.map(|(layer, _)| layer),
            &env,
            cli,
        )?;
        debug!("Configuration loaded from {:?}", sources);
        Ok((config, sources))
    }

    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }
}

/// Merging of the configuration layers
pub struct ConfigLayering;

impl ConfigLayering {
    /// defaults < global < project < environment < command line
    pub fn merge_configs(
        global: Option<SysdepsToml>,
        project: Option<SysdepsToml>,
        env: &HashMap<String, String>,
        cli: &CliOverrides,
    ) -> ConfigResult<Config> {
        let mut merged = Config::default();
        for layer in global.iter().chain(project.iter()) {
            merged.apply(layer);
        }

        Self::apply_env_overrides(&mut merged, env)?;
        Self::apply_cli_overrides(&mut merged, cli);

        validate_config(&merged)?;
        Ok(merged)
    }

    fn apply_env_overrides(config: &mut Config, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                ENV_POMS_DIR => config.repository.poms = split_paths(value),
                ENV_JARS_DIR => config.repository.jars = split_paths(value),
                ENV_SCAN_DEPTH => {
                    config.repository.scan_depth =
                        value.trim().parse().map_err(|e| SysdepsError::ConfigValidation {
                            field: ENV_SCAN_DEPTH.to_string(),
                            reason: format!("'{}' is not a number: {}", value, e),
                        })?;
                },
                ENV_VERIFY_ARTIFACTS => {
                    config.repository.verify_artifacts = parse_flag(value).ok_or_else(|| {
                        SysdepsError::ConfigValidation {
                            field: ENV_VERIFY_ARTIFACTS.to_string(),
                            reason: format!("'{}' is not a boolean", value),
                        }
                    })?;
                },
                _ => {
                    // Unknown variable, ignore
                },
            }
        }
        Ok(())
    }

    fn apply_cli_overrides(config: &mut Config, cli: &CliOverrides) {
        if !cli.poms.is_empty() {
            config.repository.poms = cli.poms.clone();
        }
        if !cli.jars.is_empty() {
            config.repository.jars = cli.jars.clone();
        }
        if let Some(depth) = cli.scan_depth {
            config.repository.scan_depth = depth;
        }
        if let Some(verify) = cli.verify_artifacts {
            config.repository.verify_artifacts = verify;
        }
    }

    /// `SYSDEPS_*` variables from the process environment
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("SYSDEPS_"))
            .collect()
    }
}

/// Split a comma-separated directory list, dropping empty entries
pub fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn split_paths_never_yields_empty_entries(value in "[a-z/ ,]{0,40}") {
            for path in split_paths(&value) {
                prop_assert!(!path.as_os_str().is_empty());
                let text = path.to_string_lossy();
                prop_assert!(!text.contains(','));
                prop_assert_eq!(text.trim(), &*text);
            }
        }
    }
}
