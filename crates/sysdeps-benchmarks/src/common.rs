//! Common utilities for benchmarks

use criterion::Criterion;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysdeps_core::DependencyKey;
use sysdeps_resolver::ResolutionRequest;
use tempfile::TempDir;

pub const BOM_GROUP: &str = "bench.platform";
pub const BOM_ARTIFACT: &str = "bench-bom";

/// Criterion defaults shared by every benchmark
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(10))
        .sample_size(50)
}

/// A generated descriptor repository in a temporary directory.
///
/// Library `i` depends on the next `fanout` libraries, inherits a parent
/// that defines `junit.version`, and declares a test-scoped junit through
/// that property. One BOM manages every library.
pub struct SyntheticRepository {
    dir: TempDir,
    artifacts: usize,
}

impl SyntheticRepository {
    pub fn generate(artifacts: usize, fanout: usize) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();

        write(
            root,
            "parent-1.pom",
            "<project><groupId>bench</groupId><artifactId>parent</artifactId><version>1</version>\
             <packaging>pom</packaging><properties><junit.version>4.13</junit.version></properties>\
             </project>",
        )?;
        write(
            root,
            "junit-4.13.pom",
            "<project><groupId>junit</groupId><artifactId>junit</artifactId><version>4.13</version></project>",
        )?;

        let mut managed = String::new();
        for i in 0..artifacts {
            let mut deps = String::new();
            for j in (i + 1)..=(i + fanout).min(artifacts.saturating_sub(1)) {
                deps.push_str(&dependency(&group(j), &artifact(j), &version(j), None));
            }
            deps.push_str(&dependency("junit", "junit", "${junit.version}", Some("test")));

            let pom = format!(
                "<project><parent><groupId>bench</groupId><artifactId>parent</artifactId>\
                 <version>1</version></parent><groupId>{}</groupId><artifactId>{}</artifactId>\
                 <version>{}</version><dependencies>{}</dependencies></project>",
                group(i),
                artifact(i),
                version(i),
                deps
            );
            write(root, &format!("{}-{}.pom", artifact(i), version(i)), &pom)?;
            managed.push_str(&dependency(&group(i), &artifact(i), &version(i), None));
        }

        let bom = format!(
            "<project><groupId>{}</groupId><artifactId>{}</artifactId><version>1.0</version>\
             <packaging>pom</packaging><dependencyManagement><dependencies>{}</dependencies>\
             </dependencyManagement></project>",
            BOM_GROUP, BOM_ARTIFACT, managed
        );
        write(root, &format!("{}-1.0.pom", BOM_ARTIFACT), &bom)?;

        Ok(Self { dir, artifacts })
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn len(&self) -> usize {
        self.artifacts
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts == 0
    }

    pub fn descriptor(&self, i: usize) -> PathBuf {
        self.dir.path().join(format!("{}-{}.pom", artifact(i), version(i)))
    }

    pub fn key(&self, i: usize) -> DependencyKey {
        DependencyKey::new(group(i), artifact(i))
    }

    /// Request for every `stride`-th library without versions, through the BOM
    pub fn request(&self, stride: usize) -> ResolutionRequest {
        let mut request = ResolutionRequest::new().bom(DependencyKey::new(BOM_GROUP, BOM_ARTIFACT), false);
        for i in (0..self.artifacts).step_by(stride.max(1)) {
            request = request.dependency(self.key(i), None);
        }
        request
    }
}

fn write(root: &Path, name: &str, content: &str) -> io::Result<()> {
    fs::write(root.join(name), content)
}

fn group(i: usize) -> String {
    format!("bench.g{}", i % 10)
}

fn artifact(i: usize) -> String {
    format!("lib-{}", i)
}

fn version(i: usize) -> String {
    format!("1.{}", i % 7)
}

fn dependency(group: &str, artifact: &str, version: &str, scope: Option<&str>) -> String {
    let mut xml = format!(
        "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version>",
        group, artifact, version
    );
    if let Some(scope) = scope {
        let _ = write!(xml, "<scope>{}</scope>", scope);
    }
    xml.push_str("</dependency>");
    xml
}

/// Version strings in the shapes found in real repositories
pub fn version_strings(count: usize) -> Vec<String> {
    const QUALIFIERS: [&str; 6] = ["", "-SNAPSHOT", "-alpha-1", "-beta2", "-RC1", ".Final"];
    (0..count)
        .map(|i| format!("{}.{}.{}{}", i % 5, i % 13, i % 31, QUALIFIERS[i % QUALIFIERS.len()]))
        .collect()
}
