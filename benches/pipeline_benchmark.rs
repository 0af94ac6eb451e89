use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use graphscape::{cluster, embed, AnalysisConfig, EmbeddedPoint, FeatureTable, Pipeline, Row};
use rand::prelude::*;
use rand::rngs::StdRng;

const FEATURES: usize = 12;
const CATEGORIES: [&str; 4] = ["Web Graphs", "Social Networks", "Road Networks", "Brain Networks"];

fn synthetic_table(n: usize) -> FeatureTable {
    let mut rng = StdRng::seed_from_u64(7);
    let rows = (0..n)
        .map(|i| {
            let c = i % CATEGORIES.len();
            let features = (0..FEATURES)
                .map(|f| (c * 3 + f % 3) as f64 + rng.gen_range(-0.5..0.5))
                .collect();
            Row::new(format!("graph{}", i), CATEGORIES[c], features)
        })
        .collect();
    FeatureTable::from_rows(rows).expect("synthetic table")
}

/// Benchmark t-SNE embedding for growing tables
fn bench_embedding(c: &mut Criterion) {
    let mut group = c.benchmark_group("tsne_embedding");
    group.sample_size(10);

    for size in [100, 250, 500].iter() {
        let table = synthetic_table(*size);
        let mut params = AnalysisConfig::default().embedding;
        params.n_iter = 300;
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let points = embed(&table, &params).expect("embed");
                criterion::black_box(points.len());
            });
        });
    }
    group.finish();
}

/// Benchmark k-means on a 2-D layout
fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");
    let mut rng = StdRng::seed_from_u64(11);
    let points: Vec<EmbeddedPoint> = (0..2000)
        .map(|i| EmbeddedPoint {
            graph_id: format!("p{}", i),
            x: (i % 8) as f64 * 10.0 + rng.gen_range(-2.0..2.0),
            y: rng.gen_range(-2.0..2.0),
        })
        .collect();

    for k in [2, 8, 16].iter() {
        let params = AnalysisConfig::default().clustering.with_k(*k);
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |b, _| {
            b.iter(|| {
                let clustering = cluster(&points, &params).expect("cluster");
                criterion::black_box(clustering.inertia);
            });
        });
    }
    group.finish();
}

/// Benchmark a full run without the sweep
fn bench_pipeline(c: &mut Criterion) {
    let table = synthetic_table(200);
    let mut config = AnalysisConfig::default();
    config.embedding.n_iter = 300;
    config.clustering.k = 4;
    config.selection.enabled = false;
    let pipeline = Pipeline::new(config);

    c.bench_function("pipeline_run_200", |b| {
        b.iter(|| {
            let report = pipeline.run(&table).expect("run");
            criterion::black_box(report.html.len());
        });
    });
}

criterion_group!(benches, bench_embedding, bench_clustering, bench_pipeline);
criterion_main!(benches);
