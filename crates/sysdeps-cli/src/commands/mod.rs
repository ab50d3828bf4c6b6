//! Command implementations and dispatch logic.
//!
//! Every handler is an async function taking the shared [`CommandContext`],
//! which carries the merged configuration and knows how to build the
//! repository pieces the commands need.

use camino::Utf8PathBuf;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sysdeps_artifacts::ArtifactVerifier;
use sysdeps_config::{CliOverrides, Config, ConfigLoader, ConfigSource};
use sysdeps_core::{SysdepsError, SysdepsResult};
use sysdeps_repository::{CacheSettings, DescriptorCache, IndexSnapshot, PomParser, RepositoryIndex};
use sysdeps_resolver::{ArtifactResolver, BucketNames};
use tracing::{debug, info};

pub mod deps;
pub mod find;
pub mod index;
pub mod plugins;
pub mod resolve;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: PathBuf,
    pub output: OutputHandler,
    pub config: Config,
    pub sources: Vec<ConfigSource>,
}

impl CommandContext {
    /// Load every configuration layer for the current directory
    pub async fn new(overrides: &CliOverrides) -> SysdepsResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| SysdepsError::io("Failed to get current directory", e))?;
        let utf8_cwd = Utf8PathBuf::from_path_buf(cwd.clone()).map_err(|path| SysdepsError::Internal {
            message: format!("Working directory {} is not valid UTF-8", path.display()),
        })?;

        let (config, sources) = ConfigLoader::new(utf8_cwd).load(overrides).await?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            config,
            sources,
        })
    }

    /// Context over an already merged configuration
    pub fn with_config(cwd: PathBuf, config: Config) -> Self {
        Self {
            cwd,
            output: OutputHandler::new(),
            config,
            sources: vec![ConfigSource::Defaults],
        }
    }

    /// Resolve `path` against the working directory
    pub fn path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    pub fn parser(&self) -> PomParser {
        let cache = &self.config.cache;
        let settings = CacheSettings {
            coordinates: cache.coordinates,
            dependency_management: cache.dependency_management,
            dependencies: cache.dependencies,
            properties: cache.properties,
            ttl: cache.ttl(),
        };
        PomParser::new(Arc::new(DescriptorCache::new(settings)))
    }

    pub fn repository_index(&self) -> Arc<RepositoryIndex> {
        Arc::new(RepositoryIndex::new(self.parser()))
    }

    /// Build the index over the configured descriptor roots
    pub fn build_index(&self) -> SysdepsResult<(Arc<RepositoryIndex>, Arc<IndexSnapshot>)> {
        let index = self.repository_index();
        let snapshot = index.build(&self.config.repository.poms)?;
        Ok((index, snapshot))
    }

    pub fn verifier(&self) -> ArtifactVerifier {
        let repo = &self.config.repository;
        if repo.verify_artifacts {
            ArtifactVerifier::file_system(repo.jars.clone(), repo.scan_depth)
        } else {
            ArtifactVerifier::AcceptAll
        }
    }

    pub fn resolver(&self, index: Arc<RepositoryIndex>) -> ArtifactResolver {
        ArtifactResolver::new(index, Arc::new(self.verifier()))
    }

    pub fn bucket_names(&self) -> BucketNames {
        let buckets = &self.config.buckets;
        BucketNames {
            default: buckets.default.clone(),
            test: buckets.test.clone(),
            runtime: buckets.runtime.clone(),
            compile_only: buckets.compile_only.clone(),
            api: buckets.api.clone(),
        }
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> SysdepsResult<()> {
    debug!("Configuration sources: {:?}", ctx.sources);
    match command {
        Commands::Resolve {
            manifest,
            deps,
            boms,
            plugins,
            json,
        } => {
            info!("Resolving (manifest: {:?}, {} extra dependencies)", manifest, deps.len());
            let args = resolve::ResolveArgs {
                manifest,
                deps,
                boms,
                plugins,
                json,
            };
            resolve::execute(args, ctx).await
        },
        Commands::Index { group } => {
            info!("Indexing descriptors (group: {:?})", group);
            index::execute(group, ctx).await
        },
        Commands::Find { group, artifact } => find::execute(&group, &artifact, ctx).await,
        Commands::Deps { pom } => deps::execute(&pom, ctx).await,
        Commands::Plugins { ids } => {
            info!("Resolving {} plugin ids", ids.len());
            plugins::execute(ids, ctx).await
        },
        Commands::Version => show_version(ctx).await,
    }
}

async fn show_version(ctx: &CommandContext) -> SysdepsResult<()> {
    ctx.output.print(&format!("sysdeps v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.info(&format!("Built: {}", env!("SYSDEPS_BUILD_DATE")));
    ctx.output.info(&format!("Target: {}", env!("SYSDEPS_TARGET")));
    ctx.output.info(&format!("Rust: {}", env!("SYSDEPS_RUSTC_VERSION")));
    Ok(())
}

/// Closest candidates to `input`, at most two edits away, best first
pub fn suggest_similar<'a, I>(input: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|candidate| (edit_distance(input, candidate), candidate))
        .filter(|(distance, _)| *distance <= 2)
        .collect();
    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().map(|(_, candidate)| candidate).take(3).collect()
}

/// Levenshtein distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        current[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
