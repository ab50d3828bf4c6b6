//! Plugins command implementation.

use super::CommandContext;
use sysdeps_core::SysdepsResult;
use sysdeps_resolver::PluginResolver;

pub async fn execute(ids: Vec<String>, ctx: &CommandContext) -> SysdepsResult<()> {
    let (index, _) = ctx.build_index()?;
    let resolver = PluginResolver::with_core_namespace(ctx.resolver(index), ctx.config.core_namespace.clone());
    let resolution = resolver.resolve(ids.as_slice());
    let out = &ctx.output;

    for plugin in &resolution.overrides {
        out.print(&format!("{} -> {}", plugin.plugin_id, plugin.module));
    }
    if !resolution.skipped.is_empty() {
        out.info(&format!("Skipped: {}", resolution.skipped.join(", ")));
    }
    for plugin_id in &resolution.unresolved {
        out.warn(&format!("Plugin not resolved: {}", plugin_id));
    }
    Ok(())
}
