//! Index command implementation.

use super::CommandContext;
use std::collections::BTreeMap;
use sysdeps_artifacts::RepositoryLayout;
use sysdeps_core::SysdepsResult;

pub async fn execute(group: Option<String>, ctx: &CommandContext) -> SysdepsResult<()> {
    let (index, snapshot) = ctx.build_index()?;
    let out = &ctx.output;

    out.info(&format!(
        "{} artifacts in {} groups ({} descriptors read, {} unreadable, {} javadoc skipped)",
        snapshot.len(),
        snapshot.group_count(),
        snapshot.descriptor_files(),
        snapshot.parse_failures(),
        snapshot.javadoc_descriptors()
    ));

    match group {
        Some(group) => {
            let mut coordinates = index.find_all_for_group(&group);
            if coordinates.is_empty() {
                out.warn(&format!("No descriptors installed for group {}", group));
                return Ok(());
            }
            coordinates.sort_by(|a, b| a.artifact_id.cmp(&b.artifact_id));
            for coordinate in coordinates {
                out.print(&coordinate.gav());
            }
        },
        None => {
            let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
            for (key, _) in snapshot.iter() {
                *groups.entry(key.group()).or_default() += 1;
            }
            for (group, count) in groups {
                out.print(&format!("{} ({})", group, count));
            }
        },
    }

    let repo = &ctx.config.repository;
    match RepositoryLayout::scan(&repo.jars, repo.scan_depth) {
        Ok(layout) => out.info(&format!("{} jar directories under the configured roots", layout.len())),
        Err(err) => out.warn(&err.to_string()),
    }
    Ok(())
}
