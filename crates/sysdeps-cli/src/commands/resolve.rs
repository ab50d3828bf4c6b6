//! Resolve command implementation.

use super::CommandContext;
use std::path::PathBuf;
use sysdeps_config::{load_manifest, RequestManifest};
use sysdeps_core::{DependencyKey, SysdepsError, SysdepsResult};
use sysdeps_resolver::{
    ConfigurationType, DeclaredBom, DeclaredDependency, ResolutionPipeline, ResolutionReport,
    ResolutionRequest,
};
use tracing::{debug, warn};

/// Arguments of `sysdeps resolve`
#[derive(Debug, Clone, Default)]
pub struct ResolveArgs {
    pub manifest: Option<PathBuf>,
    pub deps: Vec<String>,
    pub boms: Vec<String>,
    pub plugins: Vec<String>,
    pub json: bool,
}

pub async fn execute(args: ResolveArgs, ctx: &CommandContext) -> SysdepsResult<()> {
    let request = build_request(&args, ctx).await?;
    if request.is_empty() {
        ctx.output
            .warn("Nothing to resolve: pass --manifest, --dep, --bom or --plugin");
        return Ok(());
    }

    let pipeline = pipeline(ctx);
    let report = tokio::task::spawn_blocking(move || pipeline.run(request))
        .await
        .map_err(|e| SysdepsError::Internal {
            message: format!("Resolution task failed: {}", e),
        })??;

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| SysdepsError::Internal {
            message: format!("Failed to serialize report: {}", e),
        })?;
        ctx.output.print(&json);
    } else {
        print_report(&report, ctx);
    }
    Ok(())
}

pub fn pipeline(ctx: &CommandContext) -> ResolutionPipeline {
    ResolutionPipeline::new(ctx.config.repository.poms.clone(), ctx.repository_index())
        .with_verifier(ctx.verifier())
        .with_bucket_names(ctx.bucket_names())
        .with_core_namespace(ctx.config.core_namespace.clone())
}

/// Merge the manifest (if any) with the ad-hoc flags
pub async fn build_request(args: &ResolveArgs, ctx: &CommandContext) -> SysdepsResult<ResolutionRequest> {
    let mut request = match &args.manifest {
        Some(path) => {
            let path = ctx.path(path);
            debug!("Loading request manifest {}", path.display());
            request_from_manifest(load_manifest(&path).await?)
        },
        None => ResolutionRequest::new(),
    };

    for spec in &args.deps {
        let (key, version) = parse_dep_spec(spec)?;
        request = request.dependency(key, version.as_deref());
    }
    for spec in &args.boms {
        request = request.bom(parse_key(spec)?, false);
    }
    for plugin_id in &args.plugins {
        request = request.plugin(plugin_id.as_str());
    }
    Ok(request)
}

pub fn request_from_manifest(manifest: RequestManifest) -> ResolutionRequest {
    let mut request = ResolutionRequest::new();

    for entry in manifest.dependencies {
        let declaration = DeclaredDependency {
            versions: entry.versions,
            buckets: entry.buckets.into_iter().collect(),
            configuration_type: known_type(entry.configuration.as_deref()),
            test: entry.test,
        };
        request.declare(entry.key, declaration);
    }
    for entry in manifest.boms {
        let bom = DeclaredBom {
            configuration_type: known_type(entry.configuration.as_deref()),
            test: entry.test,
        };
        request.boms.insert(entry.key, bom);
    }
    request.plugins = manifest.plugins;
    request.project_modules = manifest.project_modules.into_iter().collect();
    request
}

fn known_type(configuration: Option<&str>) -> Option<ConfigurationType> {
    let kind = ConfigurationType::from_bucket_name(configuration?);
    if kind == ConfigurationType::Unknown {
        warn!("Configuration '{}' implies no bucket", configuration.unwrap_or_default());
        None
    } else {
        Some(kind)
    }
}

/// Parse `group:artifact[:version]`
pub fn parse_dep_spec(spec: &str) -> SysdepsResult<(DependencyKey, Option<String>)> {
    let key = parse_key(spec)?;
    let version = spec.trim().splitn(3, ':').nth(2).map(str::trim);
    match version {
        Some(v) if v.contains(':') => Err(SysdepsError::InvalidCoordinate {
            input: spec.to_string(),
        }),
        Some(v) if !v.is_empty() => Ok((key, Some(v.to_string()))),
        _ => Ok((key, None)),
    }
}

fn parse_key(spec: &str) -> SysdepsResult<DependencyKey> {
    spec.parse().map_err(|_| SysdepsError::InvalidCoordinate {
        input: spec.to_string(),
    })
}

fn print_report(report: &ResolutionReport, ctx: &CommandContext) {
    let out = &ctx.output;
    out.info(&format!(
        "Index: {} artifacts in {} groups",
        report.index.artifacts, report.index.groups
    ));

    out.section(
        &format!("Resolved ({})", report.resolved.len()),
        report.resolved.iter().map(|(key, version)| format!("{}:{}", key, version)),
    );

    let substitutions: Vec<&String> = report.overrides.iter().chain(&report.applies).collect();
    if !substitutions.is_empty() {
        out.section("Substitutions", substitutions);
    }
    for (bucket, gavs) in &report.buckets {
        out.section(&format!("{} ({})", bucket, gavs.len()), gavs);
    }
    if !report.plugin_overrides.is_empty() {
        out.section(
            "Plugins",
            report
                .plugin_overrides
                .iter()
                .map(|plugin| format!("{} -> {}", plugin.plugin_id, plugin.module)),
        );
    }

    for cycle in &report.cycles {
        out.warn(&format!("Dependency cycle: {}", cycle));
    }
    if !report.skipped.is_empty() {
        out.info(&format!(
            "{} transitive dependencies have no installed descriptor",
            report.skipped.len()
        ));
    }
    for key in &report.not_found {
        out.warn(&format!("Not installed: {}", key));
    }
    for plugin_id in &report.unresolved_plugins {
        out.warn(&format!("Plugin not resolved: {}", plugin_id));
    }

    if report.is_complete() {
        out.success("Every request was satisfied");
    }
}
