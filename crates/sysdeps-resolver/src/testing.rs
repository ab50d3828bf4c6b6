//! Filesystem fixtures for resolver tests

use crate::ArtifactResolver;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use sysdeps_artifacts::ArtifactVerifier;
use sysdeps_repository::{PomParser, RepositoryIndex};
use tempfile::TempDir;

/// One `<dependency>` entry
#[derive(Debug, Clone)]
pub(crate) struct Dep {
    group: String,
    artifact: String,
    version: Option<String>,
    scope: Option<String>,
    packaging: Option<String>,
}

impl Dep {
    pub fn new(group: &str, artifact: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: Some(version.to_string()),
            scope: None,
            packaging: None,
        }
    }

    /// Imported BOM entry (`<type>pom</type><scope>import</scope>`)
    pub fn bom(group: &str, artifact: &str, version: &str) -> Self {
        Self::new(group, artifact, version).packaging("pom").scope("import")
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn packaging(mut self, packaging: &str) -> Self {
        self.packaging = Some(packaging.to_string());
        self
    }

    fn to_xml(&self, out: &mut String) {
        out.push_str("<dependency>");
        let _ = write!(out, "<groupId>{}</groupId>", self.group);
        let _ = write!(out, "<artifactId>{}</artifactId>", self.artifact);
        if let Some(version) = &self.version {
            let _ = write!(out, "<version>{version}</version>");
        }
        if let Some(packaging) = &self.packaging {
            let _ = write!(out, "<type>{packaging}</type>");
        }
        if let Some(scope) = &self.scope {
            let _ = write!(out, "<scope>{scope}</scope>");
        }
        out.push_str("</dependency>");
    }
}

/// A throwaway repository with descriptor and jar directories
pub(crate) struct Repo {
    poms: TempDir,
    jars: TempDir,
}

impl Repo {
    pub fn new() -> Self {
        Self {
            poms: TempDir::new().unwrap(),
            jars: TempDir::new().unwrap(),
        }
    }

    pub fn poms_dir(&self) -> PathBuf {
        self.poms.path().to_path_buf()
    }

    pub fn jars_dir(&self) -> PathBuf {
        self.jars.path().to_path_buf()
    }

    pub fn jar(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.write_pom(group, artifact, version, "jar", &[], &[])
    }

    pub fn lib(&self, group: &str, artifact: &str, version: &str, deps: &[Dep]) -> PathBuf {
        self.write_pom(group, artifact, version, "jar", deps, &[])
    }

    pub fn bom(&self, group: &str, artifact: &str, version: &str, managed: &[Dep]) -> PathBuf {
        self.write_pom(group, artifact, version, "pom", &[], managed)
    }

    /// BOM listing its members as plain dependencies, like a plugin marker
    pub fn aggregator(&self, group: &str, artifact: &str, version: &str, deps: &[Dep]) -> PathBuf {
        self.write_pom(group, artifact, version, "pom", deps, &[])
    }

    pub fn write_pom(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
        packaging: &str,
        deps: &[Dep],
        managed: &[Dep],
    ) -> PathBuf {
        let mut xml = String::from("<project>");
        let _ = write!(
            xml,
            "<groupId>{group}</groupId><artifactId>{artifact}</artifactId>\
             <version>{version}</version><packaging>{packaging}</packaging>"
        );
        if !deps.is_empty() {
            xml.push_str("<dependencies>");
            deps.iter().for_each(|d| d.to_xml(&mut xml));
            xml.push_str("</dependencies>");
        }
        if !managed.is_empty() {
            xml.push_str("<dependencyManagement><dependencies>");
            managed.iter().for_each(|d| d.to_xml(&mut xml));
            xml.push_str("</dependencies></dependencyManagement>");
        }
        xml.push_str("</project>");

        let path = self.poms.path().join(format!("{artifact}-{version}.pom"));
        fs::write(&path, xml).unwrap();
        path
    }

    pub fn install_jar(&self, artifact: &str) {
        fs::write(self.jars.path().join(format!("{artifact}.jar")), b"").unwrap();
    }

    pub fn index(&self) -> Arc<RepositoryIndex> {
        let index = RepositoryIndex::new(PomParser::default());
        index.build(&[self.poms_dir()]).unwrap();
        Arc::new(index)
    }

    pub fn resolver(&self) -> ArtifactResolver {
        ArtifactResolver::unverified(self.index())
    }

    pub fn verified_resolver(&self) -> ArtifactResolver {
        ArtifactResolver::new(
            self.index(),
            Arc::new(ArtifactVerifier::file_system(vec![self.jars_dir()], 3)),
        )
    }
}
