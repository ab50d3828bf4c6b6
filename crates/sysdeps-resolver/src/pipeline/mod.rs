//! End-to-end resolution of a [`ResolutionRequest`]
//!
//! The run is a fixed sequence of [`ResolutionStep`]s over a shared
//! [`ResolutionContext`]. Only building the index can fail; every other
//! problem is collected into the [`ResolutionReport`].

mod report;
mod request;

#[cfg(test)]
mod tests;

pub use report::{IndexSummary, ResolutionReport};
pub use request::{DeclaredBom, DeclaredDependency, ResolutionRequest};

use crate::plugin::DEFAULT_CORE_NAMESPACE;
use crate::{
    ArtifactConfigurator, ArtifactResolver, BomExpander, BomExpansion, BucketNames,
    ConfigurationInput, ConfigurationResult, ConfigurationType, DependencySubstitutor,
    PluginResolution, PluginResolver, Resolution, ResolverResult, SubstitutionPlan,
    TransitiveClassifier, TransitiveResult,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use sysdeps_artifacts::ArtifactVerifier;
use sysdeps_core::DependencyKey;
use sysdeps_repository::{IndexSnapshot, RepositoryIndex};
use tracing::{debug, info};

/// One stage of a resolution run, executed in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    BuildIndex,
    CollectDeclared,
    ApplyBoms,
    ResolveSystemArtifacts,
    ResolveTransitives,
    Substitute,
    ConfigureArtifacts,
    ResolvePlugins,
    Report,
}

impl ResolutionStep {
    pub const ALL: [ResolutionStep; 9] = [
        ResolutionStep::BuildIndex,
        ResolutionStep::CollectDeclared,
        ResolutionStep::ApplyBoms,
        ResolutionStep::ResolveSystemArtifacts,
        ResolutionStep::ResolveTransitives,
        ResolutionStep::Substitute,
        ResolutionStep::ConfigureArtifacts,
        ResolutionStep::ResolvePlugins,
        ResolutionStep::Report,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResolutionStep::BuildIndex => "build-index",
            ResolutionStep::CollectDeclared => "collect-declared",
            ResolutionStep::ApplyBoms => "apply-boms",
            ResolutionStep::ResolveSystemArtifacts => "resolve-system-artifacts",
            ResolutionStep::ResolveTransitives => "resolve-transitives",
            ResolutionStep::Substitute => "substitute",
            ResolutionStep::ConfigureArtifacts => "configure-artifacts",
            ResolutionStep::ResolvePlugins => "resolve-plugins",
            ResolutionStep::Report => "report",
        }
    }
}

/// State threaded through the steps of one run
#[derive(Debug, Default)]
pub struct ResolutionContext {
    pub request: ResolutionRequest,
    pub snapshot: Arc<IndexSnapshot>,
    /// Declared keys and the versions they were requested at
    pub requested_versions: IndexMap<DependencyKey, Vec<String>>,
    pub buckets: IndexMap<DependencyKey, IndexSet<String>>,
    pub configuration_types: IndexMap<DependencyKey, ConfigurationType>,
    pub test_roots: HashSet<DependencyKey>,
    /// Keys to resolve against the index
    pub targets: IndexSet<DependencyKey>,
    pub expansion: BomExpansion,
    pub resolution: Resolution,
    pub filtered: Vec<DependencyKey>,
    pub transitive: TransitiveResult,
    pub plan: SubstitutionPlan,
    pub configuration: ConfigurationResult,
    pub plugins: PluginResolution,
    pub report: Option<ResolutionReport>,
}

impl ResolutionContext {
    pub fn new(request: ResolutionRequest) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }
}

/// Resolves requests against the descriptors under a set of roots
#[derive(Debug, Clone)]
pub struct ResolutionPipeline {
    roots: Vec<PathBuf>,
    index: Arc<RepositoryIndex>,
    verifier: Arc<ArtifactVerifier>,
    bucket_names: BucketNames,
    core_namespace: String,
}

impl ResolutionPipeline {
    pub fn new(roots: Vec<PathBuf>, index: Arc<RepositoryIndex>) -> Self {
        Self {
            roots,
            index,
            verifier: Arc::new(ArtifactVerifier::AcceptAll),
            bucket_names: BucketNames::default(),
            core_namespace: DEFAULT_CORE_NAMESPACE.to_string(),
        }
    }

    pub fn with_verifier(mut self, verifier: ArtifactVerifier) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    pub fn with_bucket_names(mut self, names: BucketNames) -> Self {
        self.bucket_names = names;
        self
    }

    pub fn with_core_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.core_namespace = namespace.into();
        self
    }

    pub fn index(&self) -> &Arc<RepositoryIndex> {
        &self.index
    }

    fn resolver(&self) -> ArtifactResolver {
        ArtifactResolver::new(Arc::clone(&self.index), Arc::clone(&self.verifier))
    }

    /// Run every step over `request`
    pub fn run(&self, request: ResolutionRequest) -> ResolverResult<ResolutionReport> {
        let started = Instant::now();
        let mut context = ResolutionContext::new(request);

        for step in ResolutionStep::ALL {
            debug!("Running step {}", step.name());
            self.execute(step, &mut context)?;
        }

        info!("Resolution finished in {:?}", started.elapsed());
        context.report.take().ok_or_else(|| sysdeps_core::SysdepsError::Internal {
            message: "resolution finished without a report".to_string(),
        })
    }

    /// Run a single step
    pub fn execute(&self, step: ResolutionStep, context: &mut ResolutionContext) -> ResolverResult<()> {
        match step {
            ResolutionStep::BuildIndex => {
                context.snapshot = self.index.build(&self.roots)?;
            },
            ResolutionStep::CollectDeclared => collect_declared(context),
            ResolutionStep::ApplyBoms => self.apply_boms(context),
            ResolutionStep::ResolveSystemArtifacts => {
                context.resolution = self.resolver().resolve(&context.targets);
                context.filtered = context.resolution.filter();
                info!(
                    "Resolved {} of {} requested artifacts",
                    context.resolution.artifacts.len(),
                    context.targets.len()
                );
            },
            ResolutionStep::ResolveTransitives => {
                context.transitive = TransitiveClassifier::new(self.resolver())
                    .classify(&context.resolution.artifacts, &context.test_roots);
            },
            ResolutionStep::Substitute => {
                context.plan = DependencySubstitutor::new().substitute(
                    &context.requested_versions,
                    &context.transitive.artifacts,
                    &context.expansion.managed_versions,
                );
            },
            ResolutionStep::ConfigureArtifacts => {
                let input = ConfigurationInput {
                    artifacts: context.transitive.artifacts.clone(),
                    buckets: context.buckets.clone(),
                    configuration_types: context.configuration_types.clone(),
                    test_keys: context.transitive.test.clone(),
                    scopes: context.transitive.scopes.clone(),
                    project_modules: context.request.project_modules.clone(),
                };
                context.configuration =
                    ArtifactConfigurator::new(self.bucket_names.clone()).configure(&input);
            },
            ResolutionStep::ResolvePlugins => {
                if !context.request.plugins.is_empty() {
                    context.plugins =
                        PluginResolver::with_core_namespace(self.resolver(), &self.core_namespace)
                            .resolve(context.request.plugins.as_slice());
                }
            },
            ResolutionStep::Report => {
                context.report = Some(self.build_report(context));
            },
        }
        Ok(())
    }

    fn apply_boms(&self, context: &mut ResolutionContext) {
        if context.request.boms.is_empty() {
            return;
        }

        let requested: Vec<DependencyKey> = context.request.boms.keys().cloned().collect();
        let expansion = BomExpander::new(self.resolver()).expand(&requested);

        for (bom, declared) in &context.request.boms {
            for member in expansion.flattened_members(bom) {
                let key = member.key();
                let explicitly_declared = context.request.declared.contains_key(&key);
                context.requested_versions.entry(key.clone()).or_default();
                if declared.test && !explicitly_declared {
                    context.test_roots.insert(key.clone());
                }
                if let Some(kind) = declared.configuration_type {
                    context.configuration_types.entry(key).or_insert(kind);
                }
            }
        }

        context.targets.extend(expansion.targets());
        context.expansion = expansion;
    }

    fn build_report(&self, context: &ResolutionContext) -> ResolutionReport {
        let transitive = &context.transitive;

        let not_found: BTreeSet<String> = context
            .resolution
            .not_found
            .iter()
            .chain(&context.expansion.not_found)
            .map(ToString::to_string)
            .collect();

        ResolutionReport {
            resolved: transitive
                .artifacts
                .iter()
                .map(|(key, c)| (key.to_string(), c.version.clone()))
                .collect(),
            main: transitive.main.iter().map(ToString::to_string).collect(),
            test: transitive.test.iter().map(ToString::to_string).collect(),
            not_found,
            skipped: transitive.skipped.iter().map(ToString::to_string).collect(),
            filtered: context.filtered.iter().map(ToString::to_string).collect(),
            overrides: context.plan.overrides.clone(),
            applies: context.plan.applies.clone(),
            boms: context.expansion.member_listing(),
            buckets: context.configuration.buckets.clone(),
            plugin_overrides: context.plugins.overrides.clone(),
            unresolved_plugins: context.plugins.unresolved.clone(),
            scopes: transitive
                .scopes
                .scopes()
                .iter()
                .map(|(key, scope)| (key.to_string(), *scope))
                .collect(),
            cycles: transitive.cycles.clone(),
            index: IndexSummary::from(context.snapshot.as_ref()),
            cache: self.index.parser().cache().stats(),
        }
    }
}

fn collect_declared(context: &mut ResolutionContext) {
    for (key, declared) in &context.request.declared {
        if key.has_placeholder() {
            debug!("Ignoring unresolved placeholder in {}", key);
            continue;
        }
        context
            .requested_versions
            .insert(key.clone(), declared.versions.clone());
        if !declared.buckets.is_empty() {
            context.buckets.insert(key.clone(), declared.buckets.clone());
        }
        if let Some(kind) = declared.effective_type() {
            context.configuration_types.insert(key.clone(), kind);
        }
        if declared.test {
            context.test_roots.insert(key.clone());
        }
        context.targets.insert(key.clone());
    }
    debug!("Collected {} declared dependencies", context.targets.len());
}
