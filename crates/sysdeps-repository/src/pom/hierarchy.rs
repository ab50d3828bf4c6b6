//! Parent chain loading.

use super::raw::{read_raw_pom, ParentRef, RawPom};
use super::ParseError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use sysdeps_core::utils::normalize_path;
use tracing::debug;

/// Maximum number of descriptors in one chain, the file itself included
pub const MAX_DEPTH: usize = 10;

#[derive(Debug, Clone)]
pub(crate) struct Level {
    pub path: PathBuf,
    pub pom: RawPom,
}

/// A descriptor and its ancestors, ordered root ancestor first
#[derive(Debug, Clone)]
pub(crate) struct Hierarchy {
    levels: Vec<Level>,
}

impl Hierarchy {
    /// Load `path` and walk its parent references.
    ///
    /// Only a failure to read `path` itself is an error. A missing, unreadable
    /// or repeated parent ends the chain.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let leaf = read_raw_pom(path)?;
        let mut visited = HashSet::from([path.to_path_buf()]);
        let mut chain = vec![Level {
            path: path.to_path_buf(),
            pom: leaf,
        }];

        while chain.len() < MAX_DEPTH {
            let Some(current) = chain.last() else { break };
            let Some(parent) = current.pom.parent.as_ref() else {
                break;
            };

            match locate_parent(&current.path, parent, &visited) {
                Some(level) => {
                    visited.insert(level.path.clone());
                    chain.push(level);
                },
                None => {
                    debug!(
                        "Parent unresolved for {}: {}:{}",
                        current.path.display(),
                        parent.group_id.as_deref().unwrap_or("?"),
                        parent.artifact_id.as_deref().unwrap_or("?"),
                    );
                    break;
                },
            }
        }

        chain.reverse();
        Ok(Self { levels: chain })
    }

    /// Levels from the root ancestor down to the loaded file
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// The descriptor that was asked for
    pub fn leaf(&self) -> &RawPom {
        // `load` always pushes the requested file first
        &self.levels[self.levels.len() - 1].pom
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }
}

fn locate_parent(child: &Path, parent: &ParentRef, visited: &HashSet<PathBuf>) -> Option<Level> {
    let dir = child.parent().unwrap_or_else(|| Path::new("."));
    let artifact_id = parent.artifact_id.as_deref()?;

    for candidate in parent_candidates(dir, parent, artifact_id) {
        if visited.contains(&candidate) || !candidate.is_file() {
            continue;
        }
        match read_raw_pom(&candidate) {
            Ok(pom) if pom.artifact_id.as_deref() == Some(artifact_id) => {
                return Some(Level {
                    path: candidate,
                    pom,
                });
            },
            Ok(_) => {
                debug!(
                    "Skipping parent candidate {}: artifactId does not match {}",
                    candidate.display(),
                    artifact_id
                );
            },
            Err(err) => {
                debug!("Skipping parent candidate: {}", err);
            },
        }
    }

    None
}

fn parent_candidates(dir: &Path, parent: &ParentRef, artifact_id: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);

    if let Some(relative) = parent.relative_path.as_deref() {
        let target = normalize_path(&dir.join(relative));
        if target.is_dir() {
            candidates.push(target.join("pom.xml"));
        } else {
            candidates.push(target);
        }
    }

    candidates.push(dir.join(format!("{artifact_id}.pom")));
    if let Some(version) = parent.version.as_deref() {
        candidates.push(dir.join(format!("{artifact_id}-{version}.pom")));
    }

    candidates
}
