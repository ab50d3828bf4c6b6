//! Flat-directory repository layout for installed jars.

use crate::ArtifactResult;
use std::path::PathBuf;
use sysdeps_core::SysdepsError;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Directories a host build should search for jars
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryLayout {
    directories: Vec<PathBuf>,
}

impl RepositoryLayout {
    /// List each existing root and its subdirectories down to `depth`.
    ///
    /// Fails only when none of the roots exists.
    pub fn scan(roots: &[PathBuf], depth: usize) -> ArtifactResult<Self> {
        let mut directories = Vec::new();
        let mut any_root = false;

        for root in roots {
            if !root.is_dir() {
                warn!("Artifact directory does not exist: {}", root.display());
                continue;
            }
            any_root = true;

            for entry in WalkDir::new(root)
                .max_depth(depth)
                .follow_links(true)
                .sort_by_file_name()
            {
                match entry {
                    Ok(entry) if entry.file_type().is_dir() => {
                        directories.push(entry.into_path());
                    },
                    Ok(_) => {},
                    Err(err) => warn!("Error walking {}: {}", root.display(), err),
                }
            }
        }

        if !any_root {
            let path = roots.first().cloned().unwrap_or_default();
            return Err(SysdepsError::repository_unavailable(
                path,
                "no artifact directory exists",
            ));
        }

        directories.dedup();
        info!("Artifact layout: {} directories", directories.len());
        Ok(Self { directories })
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}
