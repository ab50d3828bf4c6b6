//! Deps command implementation: what one descriptor declares.

use super::CommandContext;
use std::path::Path;
use sysdeps_core::{SysdepsError, SysdepsResult};

pub async fn execute(pom: &Path, ctx: &CommandContext) -> SysdepsResult<()> {
    let path = ctx.path(pom);
    if !path.is_file() {
        return Err(SysdepsError::io(
            format!("Failed to read {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such descriptor"),
        ));
    }

    let parser = ctx.parser();
    let out = &ctx.output;

    let coordinate = parser.parse(&path)?;
    out.print(&coordinate.gav());
    out.info(&format!("packaging: {}", coordinate.packaging));

    let dependencies = parser.parse_dependencies(&path)?;
    out.section(
        &format!("Dependencies ({})", dependencies.len()),
        dependencies.iter().map(|d| format!("{} [{}]", d.gav(), d.scope)),
    );

    let managed = parser.parse_dependency_management(&path)?;
    if !managed.is_empty() {
        out.section(
            &format!("Managed ({})", managed.len()),
            managed.iter().map(|d| d.gav()),
        );
    }

    let properties = parser.parse_properties(&path)?;
    if !properties.is_empty() {
        out.section(
            "Properties",
            properties.iter().map(|(name, value)| format!("{} = {}", name, value)),
        );
    }
    Ok(())
}
