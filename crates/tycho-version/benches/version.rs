use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tycho_version::{MatchRule, Version, VersionRange};

fn bench_parse_versions(c: &mut Criterion) {
    let versions = [
        "1",
        "1.2",
        "1.2.3",
        "3.118.0.v20220511-1400",
        "4.27.0.qualifier",
        "0.0.0",
        "2.10.100.I20230301-0800",
    ];

    c.bench_function("parse_versions", |b| {
        b.iter(|| {
            for version in versions {
                black_box(Version::parse(black_box(version)).ok());
            }
        })
    });
}

fn bench_parse_ranges(c: &mut Criterion) {
    let ranges = [
        "[1.0.0,2.0.0)",
        "(1.0,1.5]",
        "3.2",
        "0.0.0",
        "[4.27.0.v20230301,4.28.0)",
    ];

    c.bench_function("parse_ranges", |b| {
        b.iter(|| {
            for range in ranges {
                black_box(VersionRange::parse(black_box(range)).ok());
            }
        })
    });
}

fn bench_includes(c: &mut Criterion) {
    let range = MatchRule::Compatible.range_for(&Version::new(2, 3, 0));
    let candidates: Vec<Version> = ["2.3.0", "2.9.1.x", "3.0.0", "2.2.9", "1.0.0"]
        .iter()
        .map(|v| Version::parse(v).unwrap())
        .collect();

    c.bench_function("range_includes", |b| {
        b.iter(|| {
            for candidate in &candidates {
                black_box(range.includes(black_box(candidate)));
            }
        })
    });
}

criterion_group!(benches, bench_parse_versions, bench_parse_ranges, bench_includes);
criterion_main!(benches);
