//! Descriptor file discovery.

use crate::RepositoryResult;
use std::path::{Path, PathBuf};
use sysdeps_core::utils::{file_name_str, has_extension};
use sysdeps_core::SysdepsError;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Maximum directory depth searched below each root
pub const MAX_SCAN_DEPTH: usize = 10;

const DESCRIPTOR_EXTENSION: &str = "pom";
const PLUGIN_MARKER_SUFFIX: &str = ".gradle.plugin.pom";
const JAVADOC_SUFFIX: &str = "-javadoc.pom";

/// What a descriptor file describes, judged by its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// A regular library or BOM
    Library,
    /// A build-tool plugin marker (`<id>.gradle.plugin.pom`)
    PluginMarker,
    /// A javadoc companion descriptor, never resolved as a library
    Javadoc,
}

impl DescriptorKind {
    pub fn of(path: &Path) -> Self {
        match file_name_str(path) {
            Some(name) if name.ends_with(PLUGIN_MARKER_SUFFIX) => DescriptorKind::PluginMarker,
            Some(name) if name.ends_with(JAVADOC_SUFFIX) => DescriptorKind::Javadoc,
            _ => DescriptorKind::Library,
        }
    }
}

/// Collect every descriptor below `roots`, sorted per root by path.
///
/// The first root must be a readable directory. Missing sibling roots are
/// logged and skipped.
pub fn collect_descriptor_files(roots: &[PathBuf]) -> RepositoryResult<Vec<PathBuf>> {
    let Some(primary) = roots.first() else {
        return Err(SysdepsError::ConfigValidation {
            field: "repository.poms".to_string(),
            reason: "no descriptor directory configured".to_string(),
        });
    };
    ensure_readable_dir(primary)?;

    let mut files = Vec::new();
    for (i, root) in roots.iter().enumerate() {
        if i > 0 {
            if let Err(err) = ensure_readable_dir(root) {
                warn!("Skipping descriptor root: {}", err);
                continue;
            }
        }
        let before = files.len();
        walk_root(root, &mut files);
        debug!(
            "Found {} descriptor files under {}",
            files.len() - before,
            root.display()
        );
    }

    Ok(files)
}

fn ensure_readable_dir(root: &Path) -> RepositoryResult<()> {
    if !root.is_dir() {
        return Err(SysdepsError::repository_unavailable(
            root,
            "not an existing directory",
        ));
    }
    std::fs::read_dir(root)
        .map(|_| ())
        .map_err(|err| SysdepsError::repository_unavailable(root, err.to_string()))
}

fn walk_root(root: &Path, files: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(root)
        .max_depth(MAX_SCAN_DEPTH)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_file() && has_extension(path, DESCRIPTOR_EXTENSION) {
                    files.push(entry.into_path());
                }
            },
            Err(err) => warn!("Error walking {}: {}", root.display(), err),
        }
    }
}
