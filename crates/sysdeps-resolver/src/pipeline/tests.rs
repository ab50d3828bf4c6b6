use super::*;
use crate::testing::{Dep, Repo};
use sysdeps_core::Scope;

fn key(group: &str, artifact: &str) -> DependencyKey {
    DependencyKey::new(group, artifact)
}

fn pipeline(repo: &Repo) -> ResolutionPipeline {
    ResolutionPipeline::new(vec![repo.poms_dir()], repo.index())
}

#[test]
fn test_end_to_end_scenarios() {
    let repo = Repo::new();
    repo.jar("g", "a", "1.0");
    repo.jar("g", "a", "2.0");
    repo.jar("x", "y", "4.0");
    repo.jar("x", "z", "1.5");
    repo.jar("com.acme", "lib", "1.0");

    let request = ResolutionRequest::new()
        .dependency(key("g", "a"), Some("2.0"))
        .dependency(key("x", "y"), Some("3.0"))
        .dependency(key("x", "z"), None)
        .dependency(key("p", "q"), Some("1.0"))
        .dependency_in(key("com.acme", "lib"), Some("1.0"), "implementation");

    let report = pipeline(&repo).run(request).unwrap();

    assert_eq!(report.resolved.get("g:a").map(String::as_str), Some("2.0"));
    assert_eq!(report.overrides, vec!["Override version: x:y:3.0 -> 4.0"]);
    assert_eq!(
        report.applies,
        vec!["Apply system version: x:z:1.5"]
    );
    assert!(report.not_found.contains("p:q"));
    assert!(!report.resolved.contains_key("p:q"));
    assert!(report.buckets["implementation"].contains("com.acme:lib:1.0"));
    assert!(!report.is_complete());
}

#[test]
fn test_bom_members_get_managed_versions() {
    let repo = Repo::new();
    repo.bom(
        "org.acme",
        "acme-bom",
        "5.0",
        &[Dep::new("org.acme", "core", "5.0"), Dep::new("org.acme", "web", "5.0")],
    );
    repo.lib("org.acme", "core", "5.0", &[Dep::new("org.acme", "util", "5.0").scope("runtime")]);
    repo.jar("org.acme", "web", "5.0");
    repo.jar("org.acme", "util", "5.0");

    let request = ResolutionRequest::new().bom(key("org.acme", "acme-bom"), false);
    let report = pipeline(&repo).run(request).unwrap();

    assert_eq!(
        report.applies,
        vec![
            "Apply BOM version: org.acme:core:5.0",
            "Apply BOM version: org.acme:web:5.0",
            "Apply system version: org.acme:util:5.0"
        ]
    );
    assert_eq!(
        report.boms.get("org.acme:acme-bom"),
        Some(&vec!["org.acme:core:5.0".to_string(), "org.acme:web:5.0".to_string()])
    );
    assert!(report.resolved.contains_key("org.acme:util"));
    assert!(!report.resolved.contains_key("org.acme:acme-bom"));
    assert!(report.buckets["runtimeOnly"].contains("org.acme:util:5.0"));
    assert!(report.buckets["implementation"].contains("org.acme:core:5.0"));
    assert_eq!(report.scopes.get("org.acme:util"), Some(&Scope::Runtime));
}

#[test]
fn test_transitives_are_substituted() {
    let repo = Repo::new();
    repo.lib("g", "app", "1", &[Dep::new("g", "guava", "30.0")]);
    repo.jar("g", "guava", "32.1");

    let report = pipeline(&repo)
        .run(ResolutionRequest::new().dependency(key("g", "app"), Some("1")))
        .unwrap();

    assert_eq!(report.resolved.get("g:guava").map(String::as_str), Some("32.1"));
    assert!(report.overrides.is_empty());
    assert_eq!(report.applies, vec!["Apply system version: g:guava:32.1"]);
}

#[test]
fn test_test_bom_members_land_in_test_bucket() {
    let repo = Repo::new();
    repo.bom("org.junit", "junit-bom", "5.9", &[Dep::new("org.junit", "jupiter", "5.9")]);
    repo.lib("org.junit", "jupiter", "5.9", &[Dep::new("org.opentest", "opentest", "1.2")]);
    repo.jar("org.opentest", "opentest", "1.2");

    let request = ResolutionRequest::new().bom(key("org.junit", "junit-bom"), true);
    let report = pipeline(&repo).run(request).unwrap();

    let test_bucket = &report.buckets["testImplementation"];
    assert!(test_bucket.contains("org.junit:jupiter:5.9"));
    assert!(test_bucket.contains("org.opentest:opentest:1.2"));
    assert!(report.main.is_empty());
}

#[test]
fn test_project_modules_and_plugins() {
    let repo = Repo::new();
    repo.jar("com.acme", "app-api", "1.0");
    repo.jar("io.spotless", "spotless-gradle-plugin", "6.0");

    let request = ResolutionRequest::new()
        .dependency(key("com.acme", "app-api"), None)
        .project_module(key("com.acme", "app-api"))
        .plugin("io.spotless")
        .plugin("org.gradle.java")
        .plugin("com.missing");

    let report = pipeline(&repo).run(request).unwrap();
    assert!(report.buckets.is_empty());
    assert_eq!(report.plugin_overrides.len(), 1);
    assert_eq!(report.unresolved_plugins, vec!["com.missing"]);
}

#[test]
fn test_missing_primary_root_is_fatal() {
    let repo = Repo::new();
    let missing = repo.poms_dir().join("nope");
    let pipeline = ResolutionPipeline::new(vec![missing], repo.index());

    let err = pipeline.run(ResolutionRequest::new()).unwrap_err();
    assert!(matches!(
        err,
        sysdeps_core::SysdepsError::RepositoryUnavailable { .. }
    ));
}

#[test]
fn test_steps_run_in_order() {
    let names: Vec<&str> = ResolutionStep::ALL.iter().map(|s| s.name()).collect();
    assert_eq!(names.first(), Some(&"build-index"));
    assert_eq!(names.last(), Some(&"report"));
    assert_eq!(names.len(), 9);
}

#[test]
fn test_report_serializes() {
    let repo = Repo::new();
    repo.jar("g", "a", "1.0");

    let report = pipeline(&repo)
        .run(ResolutionRequest::new().dependency(key("g", "a"), None))
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["resolved"]["g:a"], "1.0");
    assert_eq!(json["index"]["artifacts"], 1);
}
