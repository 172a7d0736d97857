//! Benchmarks for one redraw cycle: decode, build, reconcile, encode.
//!
//! Run with: cargo bench -p fold-core

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fold_core::{GroupTree, build, decode, encode, reconcile};
use std::hint::black_box;

/// `count` fields spread over a few nested groups, every fifth one ungrouped.
fn fields(count: usize) -> Vec<(String, Option<String>)> {
    const PATHS: [&str; 6] = [
        "Stats",
        "Stats/Combat",
        "Stats/Combat/Modifiers",
        "Advanced",
        "Advanced/Debug",
        "Rendering",
    ];
    (0..count)
        .map(|i| {
            let path = (i % 5 != 0).then(|| PATHS[i % PATHS.len()].to_owned());
            (format!("field_{i}"), path)
        })
        .collect()
}

fn as_refs(fields: &[(String, Option<String>)]) -> Vec<(&str, Option<&str>)> {
    fields
        .iter()
        .map(|(id, path)| (id.as_str(), path.as_deref()))
        .collect()
}

fn expanded(fields: &[(String, Option<String>)]) -> GroupTree {
    let mut tree = build(as_refs(fields));
    for path in ["Stats", "Stats/Combat", "Advanced/Debug"] {
        tree.set_expanded(path, true);
    }
    tree
}

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold/cycle");

    for count in [16, 128, 1024] {
        let fields = fields(count);
        let tree = expanded(&fields);
        let text = encode(&tree);

        group.bench_with_input(BenchmarkId::new("build", count), &fields, |b, fields| {
            b.iter(|| black_box(build(as_refs(fields))));
        });

        group.bench_with_input(BenchmarkId::new("encode", count), &tree, |b, tree| {
            b.iter(|| black_box(encode(tree)));
        });

        group.bench_with_input(BenchmarkId::new("decode", count), &text, |b, text| {
            b.iter(|| black_box(decode(text)));
        });

        group.bench_with_input(BenchmarkId::new("full", count), &fields, |b, fields| {
            b.iter(|| {
                let old = decode(&text).unwrap_or_default();
                let tree = reconcile(&old, build(as_refs(fields)));
                black_box(encode(&tree))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cycle);
criterion_main!(benches);
