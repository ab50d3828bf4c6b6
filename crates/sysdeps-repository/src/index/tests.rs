//! Unit tests for the repository index

use super::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pom(group: &str, artifact: &str, version: &str, packaging: &str) -> String {
    format!(
        "<project><groupId>{group}</groupId><artifactId>{artifact}</artifactId>\
         <version>{version}</version><packaging>{packaging}</packaging></project>"
    )
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn index() -> RepositoryIndex {
    RepositoryIndex::new(PomParser::default())
}

#[test]
fn test_newer_version_wins() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a-1.0.pom", &pom("g", "a", "1.0", "jar"));
    write(dir.path(), "a-2.0.pom", &pom("g", "a", "2.0", "jar"));
    write(dir.path(), "a-1.5.pom", &pom("g", "a", "1.5", "jar"));

    let index = index();
    index.build(&[dir.path().to_path_buf()]).unwrap();

    let found = index.find("g", "a").unwrap();
    assert_eq!(found.version, "2.0");
    assert_eq!(
        found.pom_path().and_then(|p| p.file_name()),
        Some(std::ffi::OsStr::new("a-2.0.pom"))
    );
}

#[test]
fn test_equal_rank_keeps_first_seen() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.pom", &pom("g", "a", "1.0", "jar"));
    write(dir.path(), "b.pom", &pom("g", "a", "1.0.0", "jar"));

    let index = index();
    index.build(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(index.find("g", "a").unwrap().version, "1.0");
}

#[test]
fn test_group_listing_is_sorted() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "1.pom", &pom("org.acme", "zeta", "1.0", "jar"));
    write(dir.path(), "2.pom", &pom("org.acme", "alpha", "3.0", "jar"));
    write(dir.path(), "3.pom", &pom("org.acme", "mid", "1.0", "pom"));
    write(dir.path(), "4.pom", &pom("org.other", "alpha", "1.0", "jar"));
    write(dir.path(), "5.pom", &pom("org.acme", "alpha", "2.0", "jar"));
    write(dir.path(), "6.pom", &pom("org.acme", "alpha", "10.0", "jar"));

    let index = index();
    index.build(&[dir.path().to_path_buf()]).unwrap();

    let listed: Vec<String> = index
        .find_all_for_group("org.acme")
        .iter()
        .map(|c| c.gav())
        .collect();
    assert_eq!(
        listed,
        vec![
            "org.acme:alpha:2.0",
            "org.acme:alpha:3.0",
            "org.acme:alpha:10.0",
            "org.acme:mid:1.0",
            "org.acme:zeta:1.0"
        ]
    );
    assert_eq!(index.find("org.acme", "alpha").unwrap().version, "10.0");
    assert!(index.find_all_for_group("org.none").is_empty());
    assert_eq!(index.snapshot().group_count(), 2);
}

#[test]
fn test_invalid_and_broken_descriptors_are_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "good.pom", &pom("g", "good", "1.0", "jar"));
    write(dir.path(), "broken.pom", "<project><groupId>");
    write(
        dir.path(),
        "noversion.pom",
        "<project><groupId>g</groupId><artifactId>nov</artifactId></project>",
    );

    let index = index();
    let snapshot = index.build(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.descriptor_files(), 3);
    assert_eq!(snapshot.parse_failures(), 1);
    assert!(index.find("g", "nov").is_none());
}

#[test]
fn test_rebuild_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.pom", &pom("g", "a", "1.0", "jar"));
    write(dir.path(), "b.pom", &pom("g", "b", "2.0", "pom"));

    let index = index();
    let first = index.build(&[dir.path().to_path_buf()]).unwrap();
    let second = index.build(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(*first, *second);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_rebuild_replaces_snapshot() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.pom", &pom("g", "a", "1.0", "jar"));

    let index = index();
    index.build(&[dir.path().to_path_buf()]).unwrap();
    let old = index.snapshot();

    fs::remove_file(dir.path().join("a.pom")).unwrap();
    write(dir.path(), "b.pom", &pom("g", "b", "1.0", "jar"));
    index.build(&[dir.path().to_path_buf()]).unwrap();

    // Readers holding the old snapshot keep a consistent view
    assert!(old.get(&DependencyKey::new("g", "a")).is_some());
    assert!(index.find("g", "a").is_none());
    assert!(index.find("g", "b").is_some());
}

#[test]
fn test_plugin_markers_and_javadoc() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "com.acme.tool.gradle.plugin.pom",
        &pom("com.acme.tool", "com.acme.tool.gradle.plugin", "1.2", "pom"),
    );
    // Seen after the 1.2 marker at the root, in walk order
    for (sub, version) in [("v1", "1.0"), ("v2", "2.0")] {
        fs::create_dir(dir.path().join(sub)).unwrap();
        write(
            &dir.path().join(sub),
            "com.acme.tool.gradle.plugin.pom",
            &pom("com.acme.tool", "com.acme.tool.gradle.plugin", version, "pom"),
        );
    }
    write(dir.path(), "lib-javadoc.pom", &pom("g", "lib", "9.9", "jar"));
    write(dir.path(), "lib.pom", &pom("g", "lib", "1.0", "jar"));

    let index = index();
    let snapshot = index.build(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(
        index.find_plugin_marker("com.acme.tool").map(|c| c.version),
        Some("2.0".to_string())
    );
    assert_eq!(snapshot.javadoc_descriptors(), 1);
    assert_eq!(index.find("g", "lib").unwrap().version, "1.0");
}

#[test]
fn test_missing_root_fails_build() {
    let dir = TempDir::new().unwrap();
    let index = index();
    assert!(index.build(&[dir.path().join("nope")]).is_err());
    assert!(index.snapshot().is_empty());
}

#[test]
fn test_build_from_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.pom", &pom("g", "a", "1.0", "jar"));
    write(dir.path(), "b.pom", &pom("g", "b", "1.0", "jar"));

    let index = index();
    let snapshot = index.build_from_files(vec![dir.path().join("b.pom")]);
    assert_eq!(snapshot.len(), 1);
    assert!(index.find("g", "b").is_some());
}

#[test]
fn test_concurrent_readers_see_whole_snapshots() {
    let dir = TempDir::new().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("a{i}.pom"), &pom("g", &format!("a{i}"), "1.0", "jar"));
    }
    let index = Arc::new(index());
    let roots = vec![dir.path().to_path_buf()];
    index.build(&roots).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let index = Arc::clone(&index);
            scope.spawn(move || {
                for _ in 0..50 {
                    let len = index.snapshot().len();
                    assert_eq!(len, 20);
                }
            });
        }
        for _ in 0..5 {
            index.build(&roots).unwrap();
        }
    });
}
