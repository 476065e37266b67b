//! Benchmarks for fuzzy catalog matching
//!
//! Tests performance of ranking catalog keys against free-text queries and
//! of planning a page over the ranked result.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tidepool_common::CatalogItem;
use tidepool_search::{plan, FuzzyMatcher};

const SUBJECTS: &[&str] = &[
    "lake", "canyon", "forest", "harbor", "glacier", "meadow", "reef", "dune",
];

/// Build a catalog of `n` keys spread across a handful of subjects
fn catalog(n: usize) -> Vec<CatalogItem> {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let subject = SUBJECTS[i % SUBJECTS.len()];
            CatalogItem::new(format!("photos/{subject}-{i:05}.jpg"), ts, 1024)
        })
        .collect()
}

fn bench_match_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_items");
    let matcher = FuzzyMatcher::default();

    for size in [100usize, 1_000, 10_000] {
        let items = catalog(size);

        group.bench_with_input(BenchmarkId::new("exact_word", size), &items, |b, items| {
            b.iter(|| matcher.match_items(black_box("lake"), "photos/", items.clone()));
        });

        group.bench_with_input(BenchmarkId::new("typo", size), &items, |b, items| {
            b.iter(|| matcher.match_items(black_box("glaicer"), "photos/", items.clone()));
        });

        // Worst case: every window is scored and nothing survives
        group.bench_with_input(BenchmarkId::new("no_match", size), &items, |b, items| {
            b.iter(|| matcher.match_items(black_box("xyz123notfound"), "photos/", items.clone()));
        });
    }

    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    c.bench_function("distance/short_key", |b| {
        b.iter(|| FuzzyMatcher::distance(black_box("lake"), black_box("photos/lake-00001.jpg")));
    });

    c.bench_function("distance/long_key", |b| {
        b.iter(|| {
            FuzzyMatcher::distance(
                black_box("sunset"),
                black_box("collections/summer-2024/coastline/golden-hour-sunset-over-the-bay.jpg"),
            )
        });
    });
}

fn bench_plan(c: &mut Criterion) {
    let items = catalog(10_000);

    c.bench_function("plan/deep_page", |b| {
        b.iter(|| plan(black_box(&items), black_box(400), black_box(20)));
    });
}

criterion_group!(benches, bench_match_items, bench_distance, bench_plan);
criterion_main!(benches);
