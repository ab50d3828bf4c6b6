//! Find command implementation.

use super::{suggest_similar, CommandContext};
use sysdeps_artifacts::JarLocator;
use sysdeps_core::{DependencyKey, SysdepsError, SysdepsResult};

pub async fn execute(group: &str, artifact: &str, ctx: &CommandContext) -> SysdepsResult<()> {
    let (index, _) = ctx.build_index()?;
    let out = &ctx.output;
    let key = DependencyKey::new(group, artifact);

    let Some(coordinate) = index.find_key(&key) else {
        let installed = index.find_all_for_group(group);
        let suggestions = suggest_similar(artifact, installed.iter().map(|c| c.artifact_id.as_str()));
        if !suggestions.is_empty() {
            out.info(&format!("Did you mean {}?", suggestions.join(", ")));
        }
        return Err(SysdepsError::NotFound { key: key.to_string() });
    };

    out.print(&coordinate.gav());
    out.info(&format!("packaging: {}", coordinate.packaging));
    if let Some(path) = coordinate.pom_path() {
        out.info(&format!("descriptor: {}", path.display()));
    }

    if !coordinate.is_bom() {
        let repo = &ctx.config.repository;
        let locator = JarLocator::new(repo.jars.clone(), repo.scan_depth);
        match locator.locate(&coordinate) {
            Some(jar) => out.info(&format!("jar: {}", jar.display())),
            None => out.warn(&format!("No jar installed for {}", coordinate.gav())),
        }
    }
    Ok(())
}
