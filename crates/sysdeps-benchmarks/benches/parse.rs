//! Descriptor, manifest and version parsing benchmarks
//!
//! Measures descriptor reads with cold and warm caches, parent-chain
//! interpolation, request manifest parsing and version ordering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use sysdeps_benchmarks::{criterion_config, version_strings, SyntheticRepository};
use sysdeps_config::parse_manifest;
use sysdeps_core::{compare_versions, ComparableVersion};
use sysdeps_repository::{CacheSettings, DescriptorCache, PomParser};

fn bench_descriptor_parsing(c: &mut Criterion) {
    let repo = SyntheticRepository::generate(200, 3).expect("failed to generate repository");
    let mut group = c.benchmark_group("descriptor_parsing");
    group.throughput(Throughput::Elements(repo.len() as u64));

    group.bench_function("cold_cache", |b| {
        b.iter(|| {
            let parser = PomParser::new(Arc::new(DescriptorCache::new(CacheSettings::default())));
            for i in 0..repo.len() {
                black_box(parser.parse(&repo.descriptor(i)).ok());
            }
        });
    });

    let warm = PomParser::default();
    for i in 0..repo.len() {
        let _ = warm.parse(&repo.descriptor(i));
    }
    group.bench_function("warm_cache", |b| {
        b.iter(|| {
            for i in 0..repo.len() {
                black_box(warm.parse(&repo.descriptor(i)).ok());
            }
        });
    });

    group.bench_function("dependencies_with_parent", |b| {
        b.iter(|| {
            let parser = PomParser::default();
            for i in 0..repo.len() {
                black_box(parser.parse_dependencies(&repo.descriptor(i)).ok());
            }
        });
    });

    group.finish();
}

fn bench_manifest_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_parsing");

    for count in [10, 100, 1000] {
        let mut content = String::from("plugins = [\"com.acme.greeting\"]\n");
        for i in 0..count {
            let _ = write!(
                content,
                "\n[[dependency]]\nkey = \"com.acme.g{}:lib-{}\"\nversions = [\"1.{}\"]\nbuckets = [\"implementation\"]\n",
                i % 10,
                i,
                i % 7
            );
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("dependencies", count), &content, |b, content| {
            b.iter(|| black_box(parse_manifest(content, Path::new("request.toml")).ok()));
        });
    }

    group.finish();
}

fn bench_version_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_ordering");

    for count in [100, 1000] {
        let versions = version_strings(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("compare_versions", count), &versions, |b, versions| {
            b.iter(|| {
                let mut sorted = versions.clone();
                sorted.sort_by(|a, b| compare_versions(Some(a.as_str()), Some(b.as_str())));
                black_box(sorted)
            });
        });

        group.bench_with_input(BenchmarkId::new("comparable_version", count), &versions, |b, versions| {
            b.iter(|| {
                let mut sorted: Vec<ComparableVersion> =
                    versions.iter().cloned().map(ComparableVersion::new).collect();
                sorted.sort();
                black_box(sorted)
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_descriptor_parsing, bench_manifest_parsing, bench_version_ordering
}
criterion_main!(benches);
